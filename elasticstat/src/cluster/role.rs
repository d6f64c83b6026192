use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The logical category of a node, derived from the capabilities it advertises.
///
/// The declaration order is the order role groups are rendered in.
#[derive(
  Serialize,
  Deserialize,
  Hash,
  PartialEq,
  Eq,
  Ord,
  PartialOrd,
  Clone,
  Copy,
  Debug,
)]
pub enum Role {
  /// Both data and master eligible. Such nodes also coordinate requests.
  All,
  /// Master eligible, holds no data.
  Master,
  /// Holds data, not master eligible.
  Data,
  /// Only runs ingest pipelines.
  Ingest,
  /// Coordinating only: routes requests and holds nothing.
  Router,
  /// The advertised flags could not be interpreted.
  Unknown,
}
impl Role {
  /// Every role, in render order.
  pub const RENDER_ORDER: [Role; 6] = [
    Role::All,
    Role::Master,
    Role::Data,
    Role::Ingest,
    Role::Router,
    Role::Unknown,
  ];

  /// The short label used in the role column.
  pub fn label(&self) -> &'static str {
    match self {
      Role::All => "ALL",
      Role::Master => "MST",
      Role::Data => "DATA",
      Role::Ingest => "ING",
      Role::Router => "RTR",
      Role::Unknown => "UNK",
    }
  }

  /// Whether nodes of this role hold shards, and so report merge, store, and document figures.
  pub fn holds_data(&self) -> bool {
    matches!(self, Role::All | Role::Data)
  }
}
impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// The capability flags a node advertises, by name.
///
/// Older servers report string flags (`"true"`/`"false"`) under `attributes` and leave out the
/// flags that are at their default; newer ones list `roles`. Both end up here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
  flags: BTreeMap<String, Value>,
}
impl Capabilities {
  /// Wraps an attribute object as reported upstream.
  pub fn new(flags: BTreeMap<String, Value>) -> Capabilities {
    Capabilities { flags: flags }
  }

  /// Builds capabilities from a `roles` list: listed capabilities are present, the three
  /// classified ones that are not listed are explicitly absent.
  pub fn from_roles<'a, I: IntoIterator<Item = &'a str>>(roles: I) -> Capabilities {
    let mut flags = ["data", "master", "ingest"]
      .iter()
      .map(|r| (r.to_string(), Value::Bool(false)))
      .collect::<BTreeMap<_, _>>();
    for role in roles {
      // Newer servers split data into tiers: data_hot, data_content...
      let name = if role.starts_with("data") { "data" } else { role };
      flags.insert(name.to_string(), Value::Bool(true));
    }
    Capabilities { flags: flags }
  }

  /// Convenience constructor from string pairs.
  pub fn from_pairs<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(pairs: I) -> Capabilities {
    Capabilities {
      flags: pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect(),
    }
  }

  /// `Some(flag)` if the flag is set to a boolean-like value, `Some(default)` if it is absent and
  /// `None` if it holds anything else.
  pub fn flag(&self, name: &str, default: bool) -> Option<bool> {
    match self.flags.get(name) {
      None => Some(default),
      Some(Value::Bool(b)) => Some(*b),
      Some(Value::String(s)) if s == "true" => Some(true),
      Some(Value::String(s)) if s == "false" => Some(false),
      Some(_) => None,
    }
  }
}

/// Derives a node's [`Role`]. Total and pure: the same capabilities always give the same role,
/// and anything uninterpretable gives [`Role::Unknown`].
pub fn classify(caps: &Capabilities) -> Role {
  // Data and master default to present when left out, ingest to absent.
  let data = caps.flag("data", true);
  let master = caps.flag("master", true);
  let ingest = caps.flag("ingest", false);
  match (data, master, ingest) {
    (Some(true), Some(true), _) => Role::All,
    (Some(false), Some(true), _) => Role::Master,
    (Some(true), Some(false), _) => Role::Data,
    (Some(false), Some(false), Some(true)) => Role::Ingest,
    (Some(false), Some(false), Some(false)) => Role::Router,
    _ => Role::Unknown,
  }
}

#[test]
fn test_classify_defaults() {
  assert_eq!(classify(&Capabilities::default()), Role::All);
  assert_eq!(classify(&Capabilities::from_pairs(vec![("data", "false")])), Role::Master);
  assert_eq!(classify(&Capabilities::from_pairs(vec![("master", "false")])), Role::Data);
  assert_eq!(
    classify(&Capabilities::from_pairs(vec![("master", "false"), ("data", "false")])),
    Role::Router
  );
}

#[test]
fn test_classify_ingest_and_unknown() {
  let ingest =
    Capabilities::from_pairs(vec![("master", "false"), ("data", "false"), ("ingest", "true")]);
  assert_eq!(classify(&ingest), Role::Ingest);
  // Ingest does not change a data or master role.
  let data_ingest = Capabilities::from_pairs(vec![("master", "false"), ("ingest", "true")]);
  assert_eq!(classify(&data_ingest), Role::Data);
  let garbled = Capabilities::from_pairs(vec![("master", "maybe")]);
  assert_eq!(classify(&garbled), Role::Unknown);
  let garbled =
    Capabilities::from_pairs(vec![("master", "false"), ("data", "false"), ("ingest", "1")]);
  assert_eq!(classify(&garbled), Role::Unknown);
}

#[test]
fn test_classify_roles_list() {
  assert_eq!(classify(&Capabilities::from_roles(vec!["master", "data_hot"])), Role::All);
  assert_eq!(classify(&Capabilities::from_roles(vec!["ingest"])), Role::Ingest);
  assert_eq!(classify(&Capabilities::from_roles(Vec::<&str>::new())), Role::Router);
  assert_eq!(classify(&Capabilities::from_roles(vec!["master", "ingest"])), Role::Master);
}

#[test]
fn test_classify_is_idempotent() {
  let caps = Capabilities::from_pairs(vec![("data", "true"), ("master", "false")]);
  assert_eq!(classify(&caps), classify(&caps));
}
