use crate::cluster::NodeId;
use hashbrown::HashMap;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A metric each node reports as a running total since the process started.
#[derive(
  IntoPrimitive,
  TryFromPrimitive,
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
#[repr(u8)]
pub enum CounterKind {
  /// Old generation garbage collections.
  OldGcCount,
  /// Young generation garbage collections.
  YoungGcCount,
  /// Fielddata cache evictions.
  FielddataEvictions,
  /// Fielddata circuit breaker trips.
  BreakerTrips,
  /// HTTP connections opened.
  HttpOpened,
}
impl CounterKind {
  /// Number of counter kinds.
  pub const COUNT: usize = 5;

  /// Every counter kind.
  pub const ALL: [CounterKind; CounterKind::COUNT] = [
    CounterKind::OldGcCount,
    CounterKind::YoungGcCount,
    CounterKind::FielddataEvictions,
    CounterKind::BreakerTrips,
    CounterKind::HttpOpened,
  ];

  fn index(self) -> usize {
    u8::from(self) as usize
  }
}

/// The change in a counter since the previous observation of the same node.
#[derive(Serialize, Deserialize, Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub enum Delta {
  /// First observation of this node: there is nothing to compare against yet.
  NoData,
  /// The difference to the previous observation. Negative if the counter was reset upstream.
  Value(i64),
}
impl Delta {
  /// The numeric delta, if there is one.
  pub fn value(&self) -> Option<i64> {
    match self {
      Delta::NoData => None,
      Delta::Value(v) => Some(*v),
    }
  }
}
impl fmt::Display for Delta {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Delta::NoData => f.write_str("-"),
      Delta::Value(v) => write!(f, "{}", v),
    }
  }
}

/// Last observed cumulative value of every counter of every tracked node.
#[derive(Default, Debug)]
pub struct CounterStore {
  baselines: HashMap<NodeId, [Option<i64>; CounterKind::COUNT]>,
}
impl CounterStore {
  /// Creates an empty store.
  pub fn new() -> CounterStore {
    CounterStore::default()
  }

  /// Records `current` as the new baseline for `(id, kind)` and returns how far it moved since
  /// the previous baseline.
  pub fn delta(&mut self, id: &NodeId, kind: CounterKind, current: i64) -> Delta {
    let slot = &mut self
      .baselines
      .entry(id.clone())
      .or_insert([None; CounterKind::COUNT])[kind.index()];
    let delta = match *slot {
      None => Delta::NoData,
      Some(baseline) => Delta::Value(current.wrapping_sub(baseline)),
    };
    *slot = Some(current);
    delta
  }

  /// The stored baseline for `(id, kind)`.
  pub fn baseline(&self, id: &NodeId, kind: CounterKind) -> Option<i64> {
    self.baselines.get(id).and_then(|b| b[kind.index()])
  }

  /// Drops every baseline of `id`.
  pub fn forget(&mut self, id: &NodeId) {
    self.baselines.remove(id);
  }

  /// Whether any baseline is stored for `id`.
  pub fn tracks(&self, id: &NodeId) -> bool {
    self.baselines.contains_key(id)
  }

  /// Number of nodes with baselines.
  pub fn len(&self) -> usize {
    self.baselines.len()
  }

  /// Whether the store is empty.
  pub fn is_empty(&self) -> bool {
    self.baselines.is_empty()
  }
}

#[test]
fn test_counter_deltas() {
  let mut store = CounterStore::new();
  let id = NodeId::from("a");
  assert_eq!(store.delta(&id, CounterKind::OldGcCount, 10), Delta::NoData);
  assert_eq!(store.delta(&id, CounterKind::OldGcCount, 13), Delta::Value(3));
  assert_eq!(store.baseline(&id, CounterKind::OldGcCount), Some(13));
  assert_eq!(store.delta(&id, CounterKind::OldGcCount, 13), Delta::Value(0));
  // Kinds are independent of each other.
  assert_eq!(store.delta(&id, CounterKind::HttpOpened, 7), Delta::NoData);
  // A reset counter comes through as a negative delta.
  assert_eq!(store.delta(&id, CounterKind::OldGcCount, 2), Delta::Value(-11));
  assert_eq!(store.baseline(&id, CounterKind::OldGcCount), Some(2));
}

#[test]
fn test_counter_forget() {
  let mut store = CounterStore::new();
  let a = NodeId::from("a");
  let b = NodeId::from("b");
  store.delta(&a, CounterKind::BreakerTrips, 1);
  store.delta(&b, CounterKind::BreakerTrips, 1);
  store.forget(&a);
  assert!(!store.tracks(&a));
  assert_eq!(store.len(), 1);
  assert_eq!(store.delta(&a, CounterKind::BreakerTrips, 5), Delta::NoData);
  assert_eq!(store.delta(&b, CounterKind::BreakerTrips, 5), Delta::Value(4));
}

#[test]
fn test_delta_display() {
  assert_eq!(Delta::NoData.to_string(), "-");
  assert_eq!(Delta::Value(0).to_string(), "0");
  assert_eq!(Delta::Value(-2).to_string(), "-2");
}
