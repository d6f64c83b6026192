use crate::cluster::{CounterKind, Delta, NodeId, Role};
use serde::Serialize;
use smallvec::SmallVec;

/// One garbage collector: the change in collection count, and the total time spent collecting
/// as reported (not differenced).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct GcSample {
  pub count: Option<Delta>,
  pub time_ms: Option<i64>,
}

/// Occupancy of one thread pool.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct PoolSample {
  pub active: Option<i64>,
  pub queue: Option<i64>,
  pub rejected: Option<i64>,
}

/// Figures only nodes holding data report.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct DataStats {
  pub merge_time: Option<String>,
  pub store_throttle: Option<String>,
  pub docs_count: Option<i64>,
  pub docs_deleted: Option<i64>,
  pub disk_used_percent: Option<f64>,
}

/// A live node as it should be displayed this cycle. `None` stands for a field the node did
/// not report.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct NodeRecord {
  pub id: NodeId,
  pub name: String,
  pub role: Role,
  /// This node is the elected master.
  pub leader: bool,
  /// This node was first seen this cycle.
  pub joined: bool,
  pub load_average: Option<SmallVec<[f64; 3]>>,
  pub mem_used_percent: Option<i64>,
  pub heap_used_percent: Option<i64>,
  pub old_pool_used: Option<String>,
  pub old_gc: GcSample,
  pub young_gc: GcSample,
  /// One entry per configured pool, in configuration order.
  pub thread_pools: Vec<(String, PoolSample)>,
  pub fielddata_evictions: Option<Delta>,
  pub breaker_trips: Option<Delta>,
  pub http_current_open: Option<i64>,
  pub http_opened: Option<Delta>,
  pub transport_open: Option<i64>,
  /// `None` for roles that hold no data.
  pub data: Option<DataStats>,
}
impl NodeRecord {
  /// The delta computed for `kind`, if the node reported it.
  pub fn counter(&self, kind: CounterKind) -> Option<Delta> {
    match kind {
      CounterKind::OldGcCount => self.old_gc.count,
      CounterKind::YoungGcCount => self.young_gc.count,
      CounterKind::FielddataEvictions => self.fielddata_evictions,
      CounterKind::BreakerTrips => self.breaker_trips,
      CounterKind::HttpOpened => self.http_opened,
    }
  }
}

/// A tracked node missing from this cycle's snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct DepartedRecord {
  pub id: NodeId,
  /// Last known name.
  pub name: String,
  /// Role when last seen.
  pub role: Role,
}

/// One row of the node table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RenderRecord {
  /// A node present in the snapshot.
  Node(NodeRecord),
  /// A node that did not answer and has not been seen restarting.
  Departed(DepartedRecord),
}
impl RenderRecord {
  /// The identity this row is about.
  pub fn id(&self) -> &NodeId {
    match self {
      RenderRecord::Node(n) => &n.id,
      RenderRecord::Departed(d) => &d.id,
    }
  }

  /// The role group this row is listed under.
  pub fn role(&self) -> Role {
    match self {
      RenderRecord::Node(n) => n.role,
      RenderRecord::Departed(d) => d.role,
    }
  }

  /// The live node, if this row is one.
  pub fn node(&self) -> Option<&NodeRecord> {
    match self {
      RenderRecord::Node(n) => Some(n),
      RenderRecord::Departed(_) => None,
    }
  }
}
