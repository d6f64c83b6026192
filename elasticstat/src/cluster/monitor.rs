use crate::cluster::{
  CounterKind, CounterStore, DataStats, DepartedRecord, GcSample, MembershipTracker,
  MonitorConfig, NodeId, NodeRecord, PoolSample, ReconcileOutcome, RenderRecord, Role,
};
use crate::core::{NodeDoc, NodeDocs};
use crate::error::InvariantViolation;
use tracing::{debug, info};

/// The result of one cycle: what changed in the membership, and the rows to display, grouped by
/// role and then in the order nodes were added to their group.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleReport {
  /// Membership changes detected this cycle.
  pub outcome: ReconcileOutcome,
  /// Ordered node table rows, departed nodes included.
  pub records: Vec<RenderRecord>,
}
impl CycleReport {
  /// The row for `id`, if it has one.
  pub fn record(&self, id: &NodeId) -> Option<&RenderRecord> {
    self.records.iter().find(|r| r.id() == id)
  }
}

/// All state carried from one polling cycle to the next: membership and counter baselines.
#[derive(Debug)]
pub struct Monitor {
  config: MonitorConfig,
  tracker: MembershipTracker,
  counters: CounterStore,
  cycles: u64,
}
impl Monitor {
  /// Creates a monitor that has seen nothing yet.
  pub fn new(config: MonitorConfig) -> Monitor {
    Monitor {
      tracker: MembershipTracker::new(config.forget_after),
      counters: CounterStore::new(),
      config: config,
      cycles: 0,
    }
  }

  /// Folds one snapshot into the tracked state and builds this cycle's rows. `leader` is the
  /// elected master, used only to flag its row.
  ///
  /// Fails only if reconciliation broke the membership invariants, which is a bug.
  pub fn run_cycle(
    &mut self,
    nodes: &NodeDocs,
    leader: Option<&NodeId>,
  ) -> Result<CycleReport, InvariantViolation> {
    self.cycles += 1;
    let outcome = self.tracker.reconcile(nodes);
    for id in outcome.pruned() {
      self.counters.forget(id);
    }
    self.tracker.check_invariants()?;
    log_outcome(&self.tracker, &outcome);

    let tracker = &self.tracker;
    let counters = &mut self.counters;
    let mut records = Vec::with_capacity(tracker.len());
    for (role, id) in tracker.iter() {
      let record = match nodes.get(id) {
        Some(doc) => RenderRecord::Node(node_record(
          counters,
          &self.config.thread_pools,
          id,
          role,
          doc,
          tracker.newly_joined(id),
          leader == Some(id),
        )),
        None => RenderRecord::Departed(DepartedRecord {
          id: id.clone(),
          name: tracker.name_of(id).unwrap_or_else(|| id.as_str()).to_string(),
          role: role,
        }),
      };
      records.push(record);
    }
    debug!(cycle = self.cycles, rows = records.len(), "cycle reconciled");
    Ok(CycleReport {
      outcome: outcome,
      records: records,
    })
  }

  /// The membership tracker.
  pub fn tracker(&self) -> &MembershipTracker {
    &self.tracker
  }

  /// The counter baselines.
  pub fn counters(&self) -> &CounterStore {
    &self.counters
  }

  /// The configuration this monitor runs with.
  pub fn config(&self) -> &MonitorConfig {
    &self.config
  }

  /// Number of cycles run so far.
  pub fn cycles(&self) -> u64 {
    self.cycles
  }
}

fn log_outcome(tracker: &MembershipTracker, outcome: &ReconcileOutcome) {
  let name = |id: &NodeId| tracker.name_of(id).unwrap_or("?").to_string();
  for id in &outcome.joined {
    info!(node = %id, name = %name(id), "node joined");
  }
  for (old, new) in &outcome.restarted {
    info!(old = %old, new = %new, name = %name(new), "node restarted");
  }
  for (id, from, to) in &outcome.role_changes {
    info!(node = %id, name = %name(id), from = %from, to = %to, "node changed role");
  }
  for id in &outcome.departed {
    debug!(node = %id, name = %name(id), "node missing");
  }
  for id in &outcome.forgotten {
    info!(node = %id, "forgot departed node");
  }
}

const OLD_GC: [&str; 4] = ["jvm", "gc", "collectors", "old"];
const YOUNG_GC: [&str; 4] = ["jvm", "gc", "collectors", "young"];

fn gc_sample(
  counters: &mut CounterStore,
  id: &NodeId,
  kind: CounterKind,
  doc: &NodeDoc,
  collector: &[&str],
) -> GcSample {
  let path = |leaf| collector.iter().copied().chain(Some(leaf)).collect::<Vec<_>>();
  GcSample {
    count: doc
      .int(&path("collection_count"))
      .map(|c| counters.delta(id, kind, c)),
    time_ms: doc.int(&path("collection_time_in_millis")),
  }
}

fn node_record(
  counters: &mut CounterStore,
  pools: &[String],
  id: &NodeId,
  role: Role,
  doc: &NodeDoc,
  joined: bool,
  leader: bool,
) -> NodeRecord {
  let mut counter = |kind, path: &[&str]| doc.int(path).map(|v| counters.delta(id, kind, v));
  let fielddata_evictions =
    counter(CounterKind::FielddataEvictions, &["indices", "fielddata", "evictions"]);
  let breaker_trips = counter(CounterKind::BreakerTrips, &["breakers", "fielddata", "tripped"]);
  let http_opened = counter(CounterKind::HttpOpened, &["http", "total_opened"]);
  let thread_pools = pools
    .iter()
    .map(|pool| {
      let stat = |leaf| doc.int(&["thread_pool", pool.as_str(), leaf]);
      let sample = PoolSample {
        active: stat("active"),
        queue: stat("queue"),
        rejected: stat("rejected"),
      };
      (pool.clone(), sample)
    })
    .collect();
  let data = if role.holds_data() {
    let total = doc.float(&["fs", "total", "total_in_bytes"]);
    let available = doc.float(&["fs", "total", "available_in_bytes"]);
    Some(DataStats {
      merge_time: doc.text(&["indices", "merges", "total_time"]),
      store_throttle: doc.text(&["indices", "store", "throttle_time"]),
      docs_count: doc.int(&["indices", "docs", "count"]),
      docs_deleted: doc.int(&["indices", "docs", "deleted"]),
      disk_used_percent: match (total, available) {
        (Some(t), Some(a)) if t > 0.0 => Some((t - a) * 100.0 / t),
        _ => None,
      },
    })
  } else {
    None
  };
  NodeRecord {
    id: id.clone(),
    name: doc.name().unwrap_or_else(|| id.as_str()).to_string(),
    role: role,
    leader: leader,
    joined: joined,
    load_average: doc.load_average(),
    mem_used_percent: doc.int(&["os", "mem", "used_percent"]),
    heap_used_percent: doc.int(&["jvm", "mem", "heap_used_percent"]),
    old_pool_used: doc.text(&["jvm", "mem", "pools", "old", "used"]),
    old_gc: gc_sample(counters, id, CounterKind::OldGcCount, doc, &OLD_GC),
    young_gc: gc_sample(counters, id, CounterKind::YoungGcCount, doc, &YOUNG_GC),
    thread_pools: thread_pools,
    fielddata_evictions: fielddata_evictions,
    breaker_trips: breaker_trips,
    http_current_open: doc.int(&["http", "current_open"]),
    http_opened: http_opened,
    transport_open: doc.int(&["transport", "server_open"]),
    data: data,
  }
}

#[cfg(test)]
use crate::cluster::Delta;
#[cfg(test)]
use serde_json::json;

#[cfg(test)]
fn single(id: &str, doc: serde_json::Value) -> NodeDocs {
  let mut nodes = NodeDocs::new();
  nodes.insert(NodeId::from(id), NodeDoc::new(doc));
  nodes
}

#[test]
fn test_missing_fields_degrade() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let nodes = single(
    "a",
    json!({ "name": "bare", "attributes": { "master": "false", "data": "false" } }),
  );
  let report = monitor.run_cycle(&nodes, None).unwrap();
  let node = report.records[0].node().unwrap();
  assert_eq!(node.role, Role::Router);
  assert_eq!(node.old_gc, GcSample::default());
  assert!(node.data.is_none());
  assert!(node.thread_pools.iter().all(|(_, p)| *p == PoolSample::default()));
  assert!(!monitor.counters().tracks(&NodeId::from("a")));
}

#[test]
fn test_counters_move_between_cycles() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let doc = |evictions: i64, opened: i64| {
    json!({
      "name": "n1",
      "indices": { "fielddata": { "evictions": evictions } },
      "http": { "current_open": 4, "total_opened": opened }
    })
  };
  let first = monitor.run_cycle(&single("a", doc(5, 100)), None).unwrap();
  let node = first.records[0].node().unwrap();
  assert_eq!(node.counter(CounterKind::FielddataEvictions), Some(Delta::NoData));
  assert_eq!(node.counter(CounterKind::HttpOpened), Some(Delta::NoData));
  assert_eq!(node.counter(CounterKind::BreakerTrips), None);
  let second = monitor.run_cycle(&single("a", doc(7, 90)), None).unwrap();
  let node = second.records[0].node().unwrap();
  assert_eq!(node.counter(CounterKind::FielddataEvictions), Some(Delta::Value(2)));
  assert_eq!(node.counter(CounterKind::HttpOpened), Some(Delta::Value(-10)));
  assert_eq!(node.http_current_open, Some(4));
}

#[test]
fn test_data_stats_only_for_data_roles() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let nodes = single(
    "a",
    json!({
      "name": "d1",
      "attributes": { "master": "false" },
      "indices": { "docs": { "count": 10, "deleted": 1 }, "merges": { "total_time": "1.2h" } },
      "fs": { "total": { "total_in_bytes": 200, "available_in_bytes": 50 } }
    }),
  );
  let report = monitor.run_cycle(&nodes, None).unwrap();
  let data = report.records[0].node().unwrap().data.clone().unwrap();
  assert_eq!(data.docs_count, Some(10));
  assert_eq!(data.merge_time.as_deref(), Some("1.2h"));
  assert_eq!(data.store_throttle, None);
  assert_eq!(data.disk_used_percent, Some(75.0));
}
