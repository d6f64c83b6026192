use crate::error::ConfigError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError};

/// The thread pools shown when none are configured.
pub const DEFAULT_THREAD_POOLS: [&str; 5] = ["index", "search", "bulk", "get", "merge"];

/// The identifier the cluster assigns to one running node process. A restarted node comes back
/// with a new [`NodeId`], even if its name is unchanged.
#[derive(Clone, Serialize, Deserialize, Hash, PartialEq, Eq, Ord, PartialOrd, Debug)]
#[serde(transparent)]
pub struct NodeId(String);
impl NodeId {
  /// Wraps an identifier.
  pub fn new<S: Into<String>>(id: S) -> NodeId {
    NodeId(id.into())
  }

  /// The raw identifier.
  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }
}
impl From<&str> for NodeId {
  fn from(s: &str) -> Self {
    NodeId(s.to_string())
  }
}
impl From<String> for NodeId {
  fn from(s: String) -> Self {
    NodeId(s)
  }
}
impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Configures a [`Monitor`](crate::cluster::Monitor).
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct MonitorConfig {
  /// The thread pools reported for every node, in column order. Must be non-empty and free of
  /// duplicates.
  ///
  /// default: `index, search, bulk, get, merge`
  #[validate(length(min = 1), custom = "distinct_pools")]
  pub thread_pools: Vec<String>,
  /// A departed node is forgotten on the cycle that makes this many consecutive cycles without
  /// it. `None` keeps departed nodes until a restarted node with the same name replaces them.
  ///
  /// default: `None`
  #[validate(range(min = 1))]
  pub forget_after: Option<u32>,
}
impl MonitorConfig {
  /// Builds a configuration from a comma separated pool list, as typed on the command line.
  pub fn with_pool_list(pools: &str) -> Result<MonitorConfig, ConfigError> {
    let thread_pools = pools
      .split(',')
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .map(str::to_string)
      .collect_vec();
    let cfg = MonitorConfig {
      thread_pools: thread_pools,
      ..MonitorConfig::default()
    };
    cfg.checked()
  }

  /// Validates this configuration.
  pub fn checked(self) -> Result<MonitorConfig, ConfigError> {
    self.validate()?;
    Ok(self)
  }
}
impl Default for MonitorConfig {
  #[inline]
  fn default() -> Self {
    MonitorConfig {
      thread_pools: DEFAULT_THREAD_POOLS.iter().map(|p| p.to_string()).collect(),
      forget_after: None,
    }
  }
}

fn distinct_pools(pools: &Vec<String>) -> Result<(), ValidationError> {
  if pools.iter().all_unique() {
    Ok(())
  } else {
    let mut err = ValidationError::new("distinct");
    err.message = Some(Cow::from("thread pools must not repeat"));
    Err(err)
  }
}

#[test]
fn test_pool_list() {
  let cfg = MonitorConfig::with_pool_list("write, search,,get").unwrap();
  assert_eq!(cfg.thread_pools, vec!["write", "search", "get"]);
  assert!(MonitorConfig::with_pool_list(" , ").is_err());
  assert!(MonitorConfig::with_pool_list("get,search,get").is_err());
}

#[test]
fn test_forget_after_bound() {
  let cfg = MonitorConfig {
    forget_after: Some(0),
    ..MonitorConfig::default()
  };
  assert!(cfg.checked().is_err());
  let cfg = MonitorConfig {
    forget_after: Some(3),
    ..MonitorConfig::default()
  };
  assert_eq!(cfg.checked().unwrap().forget_after, Some(3));
}
