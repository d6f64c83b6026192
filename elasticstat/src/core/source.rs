use crate::cluster::NodeId;
use crate::core::snapshot::NodesStats;
use crate::core::{ClusterHealth, Endpoint, Snapshot};
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use validator::Validate;

const HEALTH_PATH: &str = "/_cluster/health";
const NODES_PATH: &str = "/_nodes/stats?human=true";
const MASTER_PATH: &str = "/_cat/master?h=id";

/// Supplies one [`Snapshot`] per cycle.
#[async_trait]
pub trait SnapshotSource: Send {
  /// Fetches the current state of the cluster. A failure must leave nothing half-fetched
  /// behind: either the whole snapshot arrives or none of it does.
  async fn fetch(&mut self) -> Result<Snapshot, FetchError>;
}

/// Configures an [`HttpSource`].
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct SourceConfig {
  /// The addresses to poll. Only one is used at a time; on failure the next one is tried on the
  /// following cycle.
  ///
  /// default: `http://localhost:9200`
  #[validate(length(min = 1))]
  pub hosts: Vec<Endpoint>,
  /// User for basic authentication.
  ///
  /// default: `None`
  pub username: Option<String>,
  /// Password for basic authentication. Never serialized.
  ///
  /// default: `None`
  #[serde(skip_serializing)]
  pub password: Option<String>,
  /// Per-request timeout in seconds. Without one a stalled server stalls the monitor.
  ///
  /// default: `None`
  #[validate(range(min = 1))]
  pub timeout_secs: Option<u64>,
}
impl SourceConfig {
  /// Validates this configuration.
  pub fn checked(self) -> Result<SourceConfig, ConfigError> {
    self.validate()?;
    Ok(self)
  }
}
impl Default for SourceConfig {
  #[inline]
  fn default() -> Self {
    SourceConfig {
      hosts: vec![Endpoint::default()],
      username: None,
      password: None,
      timeout_secs: None,
    }
  }
}

/// Polls the cluster's HTTP status API.
pub struct HttpSource {
  client: reqwest::Client,
  cfg: SourceConfig,
  current: usize,
}
impl HttpSource {
  /// Builds the HTTP client.
  pub fn new(cfg: SourceConfig) -> Result<HttpSource, ConfigError> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = cfg.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(HttpSource {
      client: builder.build()?,
      cfg: cfg,
      current: 0,
    })
  }

  /// The endpoint the next fetch goes to.
  pub fn endpoint(&self) -> Option<&Endpoint> {
    self.cfg.hosts.get(self.current)
  }

  async fn body(&self, endpoint: &Endpoint, path: &str) -> Result<String, FetchError> {
    let url = endpoint.url(path);
    let mut req = self.client.get(&url);
    if let Some(user) = &self.cfg.username {
      req = req.basic_auth(user, self.cfg.password.as_ref());
    }
    let resp = match req.send().await {
      Ok(resp) => resp,
      Err(e) => return Err(FetchError::Transport { url: url, source: e }),
    };
    let status = resp.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url,
        status: status.as_u16(),
      });
    }
    resp.text().await.map_err(|e| FetchError::Transport { url: url, source: e })
  }

  async fn json<T: DeserializeOwned>(
    &self,
    endpoint: &Endpoint,
    path: &str,
  ) -> Result<T, FetchError> {
    let body = self.body(endpoint, path).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode {
      url: endpoint.url(path),
      source: e,
    })
  }
}
#[async_trait]
impl SnapshotSource for HttpSource {
  async fn fetch(&mut self) -> Result<Snapshot, FetchError> {
    let endpoint = self.endpoint().cloned().ok_or(FetchError::NoHosts)?;
    debug!(%endpoint, "fetching snapshot");
    let fetched = tokio::try_join!(
      self.json::<ClusterHealth>(&endpoint, HEALTH_PATH),
      self.json::<NodesStats>(&endpoint, NODES_PATH),
      self.body(&endpoint, MASTER_PATH),
    );
    match fetched {
      Ok((health, stats, master)) => {
        let master = master.trim();
        Ok(Snapshot {
          health: health,
          nodes: stats.nodes,
          leader: if master.is_empty() { None } else { Some(NodeId::from(master)) },
        })
      }
      Err(e) => {
        self.current = (self.current + 1) % self.cfg.hosts.len();
        if let Some(next) = self.endpoint() {
          warn!(%endpoint, %next, "fetch failed, switching host");
        }
        Err(e)
      }
    }
  }
}
