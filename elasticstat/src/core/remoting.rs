use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// The port the status API listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 9200;

/// The DNS name or IP address of a machine serving the status API.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
pub enum Host {
  /// A name to resolve.
  DNS(String),
  /// A literal address.
  IP(IpAddr),
}
impl From<String> for Host {
  fn from(s: String) -> Self {
    match IpAddr::from_str(s.as_str()) {
      Ok(ip) => Host::IP(ip),
      Err(_) => Host::DNS(s),
    }
  }
}
impl fmt::Display for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Host::DNS(s) => f.write_str(s),
      Host::IP(IpAddr::V6(ip)) => write!(f, "[{}]", ip),
      Host::IP(ip) => write!(f, "{}", ip),
    }
  }
}

/// How to talk to an [`Endpoint`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
pub enum Scheme {
  /// Plain HTTP.
  Http,
  /// HTTP over TLS.
  Https,
}

/// One address of the status API.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, Ord, PartialOrd)]
pub struct Endpoint {
  /// Plain or TLS.
  pub scheme: Scheme,
  /// The machine serving the API.
  pub host: Host,
  /// The HTTP port.
  pub port: u16,
}
impl Endpoint {
  /// Creates a new plain HTTP [`Endpoint`].
  pub fn new(host: Host, port: u16) -> Endpoint {
    Endpoint {
      scheme: Scheme::Http,
      host: host,
      port: port,
    }
  }

  /// Parses `[scheme://]host[:port]`, using `default_port` when no port is given. IPv6
  /// addresses with a port must be bracketed.
  pub fn parse(spec: &str, default_port: u16) -> Result<Endpoint, ConfigError> {
    let spec = spec.trim();
    let (scheme, rest) = if let Some(rest) = spec.strip_prefix("https://") {
      (Scheme::Https, rest)
    } else {
      (Scheme::Http, spec.strip_prefix("http://").unwrap_or(spec))
    };
    let rest = rest.trim_end_matches('/');
    let bad = || ConfigError::Host(spec.to_string());
    if rest.is_empty() {
      return Err(bad());
    }
    let (host, port) = if let Ok(ip) = IpAddr::from_str(rest) {
      (Host::IP(ip), default_port)
    } else if let Some(bracketed) = rest.strip_prefix('[') {
      let (ip, tail) = bracketed.split_once(']').ok_or_else(bad)?;
      let ip = IpAddr::from_str(ip).map_err(|_| bad())?;
      let port = match tail.strip_prefix(':') {
        Some(p) => p.parse::<u16>().map_err(|_| bad())?,
        None if tail.is_empty() => default_port,
        None => return Err(bad()),
      };
      (Host::IP(ip), port)
    } else {
      match rest.rsplit_once(':') {
        Some((host, port)) => {
          let port = port.parse::<u16>().map_err(|_| bad())?;
          if host.is_empty() {
            return Err(bad());
          }
          (Host::from(host.to_string()), port)
        }
        None => (Host::from(rest.to_string()), default_port),
      }
    };
    Ok(Endpoint {
      scheme: scheme,
      host: host,
      port: port,
    })
  }

  /// Parses a comma separated host list.
  pub fn parse_list(list: &str, default_port: u16) -> Result<Vec<Endpoint>, ConfigError> {
    list
      .split(',')
      .filter(|s| !s.trim().is_empty())
      .map(|s| Endpoint::parse(s, default_port))
      .collect()
  }

  /// The URL of `path` on this endpoint. `path` starts with a slash.
  pub fn url(&self, path: &str) -> String {
    format!("{}{}", self, path)
  }
}
impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let scheme = match self.scheme {
      Scheme::Http => "http",
      Scheme::Https => "https",
    };
    write!(f, "{}://{}:{}", scheme, self.host, self.port)
  }
}
impl Default for Endpoint {
  fn default() -> Self {
    Endpoint::new(Host::DNS("localhost".to_string()), DEFAULT_PORT)
  }
}

#[cfg(test)]
use std::net::{Ipv4Addr, Ipv6Addr};

#[test]
fn test_endpoint_parse() {
  let e = Endpoint::parse("localhost", 9200).unwrap();
  assert_eq!(e, Endpoint::default());
  let e = Endpoint::parse("es1.example.com:9201", 9200).unwrap();
  assert_eq!(e.host, Host::DNS("es1.example.com".to_string()));
  assert_eq!(e.port, 9201);
  let e = Endpoint::parse("https://10.0.0.7", 9200).unwrap();
  assert_eq!(e.scheme, Scheme::Https);
  assert_eq!(e.host, Host::IP(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7))));
  assert_eq!(e.url("/_cluster/health"), "https://10.0.0.7:9200/_cluster/health");
  let e = Endpoint::parse("[::1]:9300", 9200).unwrap();
  assert_eq!(e.host, Host::IP(IpAddr::V6(Ipv6Addr::LOCALHOST)));
  assert_eq!(e.to_string(), "http://[::1]:9300");
  assert_eq!(Endpoint::parse("::1", 9200).unwrap().port, 9200);
}

#[test]
fn test_endpoint_parse_errors() {
  assert!(Endpoint::parse("", 9200).is_err());
  assert!(Endpoint::parse("host:notaport", 9200).is_err());
  assert!(Endpoint::parse(":9200", 9200).is_err());
  assert!(Endpoint::parse("[::1", 9200).is_err());
}

#[test]
fn test_endpoint_list() {
  let list = Endpoint::parse_list("a:1, b ,c:3,", 9200).unwrap();
  assert_eq!(list.iter().map(|e| e.port).collect::<Vec<_>>(), vec![1, 9200, 3]);
}
