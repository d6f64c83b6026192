use crate::cluster::NodeId;
use crate::core::{ClusterHealth, HealthStatus, NodeDoc, Snapshot};
use serde_json::{json, Value};

/// Builds a node statistics document field by field.
#[derive(Clone, Debug)]
pub struct NodeDocBuilder {
  doc: Value,
}
impl NodeDocBuilder {
  /// A document holding only a name. Without attributes the node classifies as `ALL`.
  pub fn new(name: &str) -> NodeDocBuilder {
    NodeDocBuilder {
      doc: json!({ "name": name }),
    }
  }

  /// Sets `value` at `path`, creating objects along the way.
  pub fn set<V: Into<Value>>(mut self, path: &[&str], value: V) -> NodeDocBuilder {
    let mut slot = &mut self.doc;
    for key in path {
      if !slot.is_object() {
        *slot = json!({});
      }
      slot = &mut slot[*key];
    }
    *slot = value.into();
    self
  }

  /// Sets a capability attribute, as a string the way the cluster reports it.
  pub fn attribute(self, key: &str, value: bool) -> NodeDocBuilder {
    self.set(&["attributes", key], value.to_string())
  }

  /// Sets the `roles` list.
  pub fn roles(self, roles: &[&str]) -> NodeDocBuilder {
    self.set(&["roles"], roles.iter().map(|r| Value::from(*r)).collect::<Vec<_>>())
  }

  /// Sets the old generation collector totals.
  pub fn old_gc(self, count: i64, time_ms: i64) -> NodeDocBuilder {
    self.collector("old", count, time_ms)
  }

  /// Sets the young generation collector totals.
  pub fn young_gc(self, count: i64, time_ms: i64) -> NodeDocBuilder {
    self.collector("young", count, time_ms)
  }

  fn collector(self, name: &str, count: i64, time_ms: i64) -> NodeDocBuilder {
    self
      .set(&["jvm", "gc", "collectors", name, "collection_count"], count)
      .set(&["jvm", "gc", "collectors", name, "collection_time_in_millis"], time_ms)
  }

  /// Sets fielddata evictions and breaker trips.
  pub fn fielddata(self, evictions: i64, tripped: i64) -> NodeDocBuilder {
    self
      .set(&["indices", "fielddata", "evictions"], evictions)
      .set(&["breakers", "fielddata", "tripped"], tripped)
  }

  /// Sets HTTP connection figures.
  pub fn http(self, current_open: i64, total_opened: i64) -> NodeDocBuilder {
    self
      .set(&["http", "current_open"], current_open)
      .set(&["http", "total_opened"], total_opened)
  }

  /// Sets one thread pool's occupancy.
  pub fn pool(self, name: &str, active: i64, queue: i64, rejected: i64) -> NodeDocBuilder {
    self
      .set(&["thread_pool", name, "active"], active)
      .set(&["thread_pool", name, "queue"], queue)
      .set(&["thread_pool", name, "rejected"], rejected)
  }

  /// Sets the load averages in the older array form.
  pub fn load(self, loads: &[f64]) -> NodeDocBuilder {
    self.set(&["os", "load_average"], loads.to_vec())
  }

  /// The finished document.
  pub fn build(self) -> NodeDoc {
    NodeDoc::new(self.doc)
  }
}

/// Builds a [`Snapshot`], keeping nodes in the order they are added.
#[derive(Clone, Debug, Default)]
pub struct SnapshotBuilder {
  snapshot: Snapshot,
}
impl SnapshotBuilder {
  /// A green cluster named `cluster` with no nodes.
  pub fn new(cluster: &str) -> SnapshotBuilder {
    SnapshotBuilder {
      snapshot: Snapshot {
        health: ClusterHealth {
          cluster_name: Some(cluster.to_string()),
          status: HealthStatus::Green,
          ..ClusterHealth::default()
        },
        ..Snapshot::default()
      },
    }
  }

  /// Replaces the health record.
  pub fn health(mut self, health: ClusterHealth) -> SnapshotBuilder {
    self.snapshot.health = health;
    self
  }

  /// Adds a node under identity `id`.
  pub fn node(mut self, id: &str, doc: NodeDocBuilder) -> SnapshotBuilder {
    self.snapshot.nodes.insert(NodeId::from(id), doc.build());
    self
  }

  /// Marks `id` as the elected master.
  pub fn leader(mut self, id: &str) -> SnapshotBuilder {
    self.snapshot.leader = Some(NodeId::from(id));
    self
  }

  /// The finished snapshot.
  pub fn build(self) -> Snapshot {
    self.snapshot
  }
}

#[cfg(test)]
use crate::cluster::{classify, Role};

#[test]
fn test_node_doc_builder() {
  let doc = NodeDocBuilder::new("n1")
    .attribute("master", false)
    .old_gc(7, 300)
    .pool("search", 1, 2, 3)
    .build();
  assert_eq!(doc.name(), Some("n1"));
  assert_eq!(classify(&doc.capabilities()), Role::Data);
  assert_eq!(doc.int(&["jvm", "gc", "collectors", "old", "collection_count"]), Some(7));
  assert_eq!(doc.int(&["thread_pool", "search", "rejected"]), Some(3));
  let over = NodeDocBuilder::new("n2").set(&["name", "inner"], 1).build();
  assert_eq!(over.int(&["name", "inner"]), Some(1));
}

#[test]
fn test_snapshot_builder() {
  let snapshot = SnapshotBuilder::new("prod")
    .node("b", NodeDocBuilder::new("nb"))
    .node("a", NodeDocBuilder::new("na"))
    .leader("a")
    .build();
  let ids = snapshot.nodes.keys().map(NodeId::as_str).collect::<Vec<_>>();
  assert_eq!(ids, vec!["b", "a"]);
  assert_eq!(snapshot.leader, Some(NodeId::from("a")));
  assert_eq!(snapshot.health.cluster_name.as_deref(), Some("prod"));
}
