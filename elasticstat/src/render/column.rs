use crate::cluster::{Delta, GcSample, NodeRecord};
use itertools::Itertools;
use std::fmt::Display;

pub(crate) const PLACEHOLDER: &str = "-";

/// How a cell is padded to its column's width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Align {
  Left,
  Right,
  Center,
}
impl Align {
  pub(crate) fn pad(&self, cell: &str, width: usize) -> String {
    match self {
      Align::Left => format!("{:<1$}", cell, width),
      Align::Right => format!("{:>1$}", cell, width),
      Align::Center => format!("{:^1$}", cell, width),
    }
  }
}

/// One column of the node table. Each variant knows its heading, width, and how to produce its
/// cell from a [`NodeRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Column {
  /// Node name, prefixed with `+` the cycle it joins.
  Name,
  /// Role label, suffixed with `*` for the elected master.
  Role,
  /// 1/5/15 minute load averages.
  Load,
  /// OS memory used.
  Mem,
  /// JVM heap used.
  Heap,
  /// Size of the old generation.
  OldGcSize,
  /// Old generation collections this interval, and total collection time.
  OldGc,
  /// Young generation collections this interval, and total collection time.
  YoungGc,
  /// `active|queue|rejected` for the named pool.
  ThreadPool(String),
  /// Fielddata evictions and breaker trips this interval.
  Fielddata,
  /// Open HTTP connections, and connections opened this interval.
  HttpConn,
  /// Open transport connections.
  TransportConn,
  /// Total time spent merging.
  MergeTime,
  /// Total time indexing was throttled.
  StoreThrottle,
  /// Disk used on the data paths.
  Disk,
  /// Document and deleted document counts.
  Docs,
}
impl Column {
  /// The heading text.
  pub fn heading(&self) -> &str {
    match self {
      Column::Name => "nodes",
      Column::Role => "role",
      Column::Load => "load",
      Column::Mem => "mem",
      Column::Heap => "heap",
      Column::OldGcSize => "old sz",
      Column::OldGc => "old gc",
      Column::YoungGc => "young gc",
      Column::ThreadPool(pool) => pool.as_str(),
      Column::Fielddata => "fde|fdt",
      Column::HttpConn => "hconn",
      Column::TransportConn => "tconn",
      Column::MergeTime => "merges",
      Column::StoreThrottle => "idx st",
      Column::Disk => "disk",
      Column::Docs => "docs",
    }
  }

  /// The minimum width cells are padded to. Longer cells overflow.
  pub fn width(&self) -> usize {
    match self {
      Column::Name => 24,
      Column::Role => 6,
      Column::Load => 18,
      Column::Mem | Column::Heap => 4,
      Column::OldGcSize | Column::OldGc | Column::YoungGc | Column::ThreadPool(_) => 8,
      Column::Fielddata => 7,
      Column::HttpConn | Column::TransportConn => 6,
      Column::MergeTime | Column::StoreThrottle => 8,
      Column::Disk => 5,
      Column::Docs => 0,
    }
  }

  /// How cells are padded.
  pub fn align(&self) -> Align {
    match self {
      Column::Name | Column::Role | Column::OldGcSize | Column::OldGc | Column::YoungGc => {
        Align::Left
      }
      Column::ThreadPool(_) | Column::Docs => Align::Left,
      Column::Fielddata => Align::Center,
      _ => Align::Right,
    }
  }

  /// The unpadded cell for `node`. Missing figures come out as `-`.
  pub fn cell(&self, node: &NodeRecord) -> String {
    match self {
      Column::Name if node.joined => format!("+{}", node.name),
      Column::Name => node.name.clone(),
      Column::Role if node.leader => format!("{}*", node.role),
      Column::Role => node.role.to_string(),
      Column::Load => match &node.load_average {
        Some(loads) if !loads.is_empty() => loads.iter().map(|l| format!("{:.2}", l)).join("/"),
        _ => PLACEHOLDER.to_string(),
      },
      Column::Mem => percent(node.mem_used_percent),
      Column::Heap => percent(node.heap_used_percent),
      Column::OldGcSize => text(node.old_pool_used.as_deref()),
      Column::OldGc => gc(&node.old_gc),
      Column::YoungGc => gc(&node.young_gc),
      Column::ThreadPool(pool) => {
        let sample = node.thread_pools.iter().find(|(name, _)| name == pool).map(|(_, s)| s);
        format!(
          "{}|{}|{}",
          opt(sample.and_then(|s| s.active)),
          opt(sample.and_then(|s| s.queue)),
          opt(sample.and_then(|s| s.rejected))
        )
      }
      Column::Fielddata => {
        format!("{}|{}", delta(node.fielddata_evictions), delta(node.breaker_trips))
      }
      Column::HttpConn => format!("{}|{}", opt(node.http_current_open), delta(node.http_opened)),
      Column::TransportConn => opt(node.transport_open),
      Column::MergeTime => text(node.data.as_ref().and_then(|d| d.merge_time.as_deref())),
      Column::StoreThrottle => text(node.data.as_ref().and_then(|d| d.store_throttle.as_deref())),
      Column::Disk => match node.data.as_ref().and_then(|d| d.disk_used_percent) {
        Some(used) => format!("{:.0}%", used),
        None => PLACEHOLDER.to_string(),
      },
      Column::Docs => {
        let data = node.data.as_ref();
        format!(
          "{}|{}",
          opt(data.and_then(|d| d.docs_count)),
          opt(data.and_then(|d| d.docs_deleted))
        )
      }
    }
  }
}

fn opt<T: Display>(value: Option<T>) -> String {
  match value {
    Some(v) => v.to_string(),
    None => PLACEHOLDER.to_string(),
  }
}

fn text(value: Option<&str>) -> String {
  value.unwrap_or(PLACEHOLDER).to_string()
}

fn percent(value: Option<i64>) -> String {
  match value {
    Some(v) => format!("{}%", v),
    None => PLACEHOLDER.to_string(),
  }
}

// A missing counter and one without a baseline look the same.
fn delta(value: Option<Delta>) -> String {
  opt(value)
}

fn gc(sample: &GcSample) -> String {
  let time = match sample.time_ms {
    Some(ms) => format!("{}ms", ms),
    None => PLACEHOLDER.to_string(),
  };
  format!("{}|{}", delta(sample.count), time)
}

#[cfg(test)]
use crate::cluster::{DataStats, NodeId, PoolSample, Role};
#[cfg(test)]
use smallvec::smallvec;

#[cfg(test)]
fn record() -> NodeRecord {
  NodeRecord {
    id: NodeId::from("id1"),
    name: "n1".to_string(),
    role: Role::All,
    leader: false,
    joined: false,
    load_average: Some(smallvec![0.5, 1.25, 2.0]),
    mem_used_percent: Some(87),
    heap_used_percent: None,
    old_pool_used: Some("1.1gb".to_string()),
    old_gc: GcSample {
      count: Some(Delta::Value(3)),
      time_ms: Some(120),
    },
    young_gc: GcSample {
      count: Some(Delta::NoData),
      time_ms: Some(40),
    },
    thread_pools: vec![(
      "search".to_string(),
      PoolSample {
        active: Some(2),
        queue: Some(0),
        rejected: None,
      },
    )],
    fielddata_evictions: Some(Delta::Value(0)),
    breaker_trips: None,
    http_current_open: Some(12),
    http_opened: Some(Delta::NoData),
    transport_open: Some(26),
    data: Some(DataStats {
      docs_count: Some(100),
      disk_used_percent: Some(41.6),
      ..DataStats::default()
    }),
  }
}

#[test]
fn test_cells() {
  let node = record();
  assert_eq!(Column::Name.cell(&node), "n1");
  assert_eq!(Column::Role.cell(&node), "ALL");
  assert_eq!(Column::Load.cell(&node), "0.50/1.25/2.00");
  assert_eq!(Column::Mem.cell(&node), "87%");
  assert_eq!(Column::Heap.cell(&node), "-");
  assert_eq!(Column::OldGc.cell(&node), "3|120ms");
  assert_eq!(Column::YoungGc.cell(&node), "-|40ms");
  assert_eq!(Column::ThreadPool("search".to_string()).cell(&node), "2|0|-");
  assert_eq!(Column::ThreadPool("bulk".to_string()).cell(&node), "-|-|-");
  assert_eq!(Column::Fielddata.cell(&node), "0|-");
  assert_eq!(Column::HttpConn.cell(&node), "12|-");
  assert_eq!(Column::MergeTime.cell(&node), "-");
  assert_eq!(Column::Disk.cell(&node), "42%");
  assert_eq!(Column::Docs.cell(&node), "100|-");
}

#[test]
fn test_markers() {
  let mut node = record();
  node.joined = true;
  node.leader = true;
  assert_eq!(Column::Name.cell(&node), "+n1");
  assert_eq!(Column::Role.cell(&node), "ALL*");
  assert_eq!(Column::Role.align().pad("ALL*", Column::Role.width()), "ALL*  ");
  assert_eq!(Column::Fielddata.align().pad("1|2", 7), "  1|2  ");
}

#[test]
fn test_non_data_node() {
  let mut node = record();
  node.role = Role::Router;
  node.data = None;
  assert_eq!(Column::MergeTime.cell(&node), "-");
  assert_eq!(Column::StoreThrottle.cell(&node), "-");
  assert_eq!(Column::Disk.cell(&node), "-");
  assert_eq!(Column::Docs.cell(&node), "-|-");
}
