use crate::cluster::{Capabilities, NodeId};
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// Node documents keyed by identity, in the order the source reported them.
pub type NodeDocs = LinkedHashMap<NodeId, NodeDoc>;

/// Overall cluster state as reported by the health endpoint.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
  /// Every shard is allocated.
  Green,
  /// Every primary is allocated, some replicas are not.
  Yellow,
  /// Some primaries are unallocated.
  Red,
  /// Missing, or a status this tool does not know.
  #[serde(other)]
  Unknown,
}
impl Default for HealthStatus {
  fn default() -> Self {
    HealthStatus::Unknown
  }
}
impl fmt::Display for HealthStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      HealthStatus::Green => "green",
      HealthStatus::Yellow => "yellow",
      HealthStatus::Red => "red",
      HealthStatus::Unknown => "-",
    })
  }
}

/// The cluster-wide health record. Every field is optional upstream.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[allow(missing_docs)]
pub struct ClusterHealth {
  pub cluster_name: Option<String>,
  #[serde(default)]
  pub status: HealthStatus,
  pub active_shards: Option<u64>,
  pub active_primary_shards: Option<u64>,
  pub relocating_shards: Option<u64>,
  pub initializing_shards: Option<u64>,
  pub unassigned_shards: Option<u64>,
  pub number_of_pending_tasks: Option<u64>,
}

/// The body of the node stats endpoint. Only `nodes` is of interest.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct NodesStats {
  #[serde(default)]
  pub nodes: NodeDocs,
}

/// Everything one cycle needs: health, node documents, and the elected master.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
  /// The cluster health record.
  pub health: ClusterHealth,
  /// One document per live node.
  pub nodes: NodeDocs,
  /// The identity of the elected master, if one is known.
  pub leader: Option<NodeId>,
}

/// The raw statistics document one node reports. Nothing in it is guaranteed to be present;
/// every accessor returns `None` when a field is missing or has an unexpected type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeDoc(Value);
impl NodeDoc {
  /// Wraps a JSON document.
  pub fn new(doc: Value) -> NodeDoc {
    NodeDoc(doc)
  }

  /// The raw document.
  pub fn raw(&self) -> &Value {
    &self.0
  }

  /// The value at `path`, one object key per segment.
  pub fn get(&self, path: &[&str]) -> Option<&Value> {
    path.iter().try_fold(&self.0, |v, key| v.get(key))
  }

  /// An integer at `path`. Numeric strings are accepted.
  pub fn int(&self, path: &[&str]) -> Option<i64> {
    match self.get(path)? {
      Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
      Value::String(s) => s.parse().ok(),
      _ => None,
    }
  }

  /// A number at `path`. Numeric strings are accepted.
  pub fn float(&self, path: &[&str]) -> Option<f64> {
    match self.get(path)? {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.parse().ok(),
      _ => None,
    }
  }

  /// A scalar at `path` as display text. Human readable sizes and times (`"1.2gb"`) come
  /// through verbatim.
  pub fn text(&self, path: &[&str]) -> Option<String> {
    match self.get(path)? {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      Value::Bool(b) => Some(b.to_string()),
      _ => None,
    }
  }

  /// The node's human readable name.
  pub fn name(&self) -> Option<&str> {
    self.get(&["name"]).and_then(Value::as_str)
  }

  /// The capabilities the node advertises: its `roles` list when present, otherwise its
  /// `attributes` object.
  pub fn capabilities(&self) -> Capabilities {
    if let Some(Value::Array(roles)) = self.get(&["roles"]) {
      return Capabilities::from_roles(roles.iter().filter_map(Value::as_str));
    }
    match self.get(&["attributes"]) {
      Some(Value::Object(attrs)) => {
        Capabilities::new(attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
      }
      _ => Capabilities::default(),
    }
  }

  /// The 1, 5, and 15 minute load averages. Older servers report an array under
  /// `os.load_average`, newer ones an object under `os.cpu.load_average`.
  pub fn load_average(&self) -> Option<SmallVec<[f64; 3]>> {
    match self.get(&["os", "load_average"]) {
      Some(Value::Array(loads)) => return loads.iter().map(Value::as_f64).collect(),
      Some(Value::Number(n)) => return n.as_f64().map(|l| smallvec![l]),
      _ => {}
    }
    let cpu = self.get(&["os", "cpu", "load_average"])?;
    ["1m", "5m", "15m"]
      .iter()
      .map(|k| cpu.get(k).and_then(Value::as_f64))
      .collect()
  }
}
impl From<Value> for NodeDoc {
  fn from(doc: Value) -> Self {
    NodeDoc(doc)
  }
}

#[cfg(test)]
use serde_json::json;
#[cfg(test)]
use crate::cluster::{classify, Role};

#[test]
fn test_node_doc_accessors() {
  let doc = NodeDoc::new(json!({
    "name": "n1",
    "jvm": { "mem": { "heap_used_percent": 41, "pools": { "old": { "used": "1.1gb" } } } },
    "indices": { "docs": { "count": "12" } }
  }));
  assert_eq!(doc.name(), Some("n1"));
  assert_eq!(doc.int(&["jvm", "mem", "heap_used_percent"]), Some(41));
  assert_eq!(doc.text(&["jvm", "mem", "pools", "old", "used"]), Some("1.1gb".to_string()));
  assert_eq!(doc.int(&["indices", "docs", "count"]), Some(12));
  assert_eq!(doc.int(&["indices", "docs", "deleted"]), None);
  assert_eq!(doc.int(&["name", "deeper"]), None);
}

#[test]
fn test_node_doc_load_average() {
  let old = NodeDoc::new(json!({ "os": { "load_average": [0.5, 0.25, 1.0] } }));
  assert_eq!(old.load_average().unwrap().as_slice(), &[0.5, 0.25, 1.0]);
  let new = NodeDoc::new(json!({
    "os": { "cpu": { "load_average": { "1m": 2.0, "5m": 1.5, "15m": 1.0 } } }
  }));
  assert_eq!(new.load_average().unwrap().as_slice(), &[2.0, 1.5, 1.0]);
  let single = NodeDoc::new(json!({ "os": { "load_average": 0.75 } }));
  assert_eq!(single.load_average().unwrap().as_slice(), &[0.75]);
  assert!(NodeDoc::default().load_average().is_none());
}

#[test]
fn test_node_doc_capabilities() {
  let attrs = NodeDoc::new(json!({ "attributes": { "master": "false" } }));
  assert_eq!(classify(&attrs.capabilities()), Role::Data);
  let roles = NodeDoc::new(json!({ "roles": ["master"], "attributes": { "data": "true" } }));
  assert_eq!(classify(&roles.capabilities()), Role::Master);
  assert_eq!(classify(&NodeDoc::default().capabilities()), Role::All);
}

#[test]
fn test_health_decode() {
  let health: ClusterHealth = serde_json::from_value(json!({
    "cluster_name": "prod",
    "status": "yellow",
    "active_shards": 10,
    "timed_out": false
  }))
  .unwrap();
  assert_eq!(health.status, HealthStatus::Yellow);
  assert_eq!(health.active_shards, Some(10));
  assert_eq!(health.unassigned_shards, None);
  let health: ClusterHealth = serde_json::from_value(json!({ "status": "purple" })).unwrap();
  assert_eq!(health.status, HealthStatus::Unknown);
}

#[test]
fn test_nodes_stats_keep_order() {
  let stats: NodesStats = serde_json::from_str(
    r#"{"cluster_name":"c","nodes":{"zz":{"name":"b"},"aa":{"name":"a"}}}"#,
  )
  .unwrap();
  let ids = stats.nodes.keys().map(NodeId::as_str).collect::<Vec<_>>();
  assert_eq!(ids, vec!["zz", "aa"]);
}
