//! Keep track of which nodes make up a cluster, and of how their counters move between polls.
//!
//! Each poll hands the [`Monitor`] a fresh map from node identifier to that node's statistics
//! document. The [`Monitor`] compares it with what it saw before, and answers with one
//! [`RenderRecord`] per node it knows about.
//!
//! ### Identities and Names
//! The cluster assigns every node process an identifier ([`NodeId`]). The identifier is not
//! stable: a node that restarts rejoins under a new one, even though its name is unchanged. When
//! a known identifier goes missing in the same poll a new identifier with the same name appears,
//! the [`MembershipTracker`] treats the pair as a restart. The old identifier is dropped along
//! with its counter baselines, and the new one starts from scratch. A missing identifier that
//! cannot be matched that way is reported as departed on every poll, until it either comes back
//! or a same-named replacement shows up. Departed nodes are never dropped on a timer unless the
//! [`MonitorConfig`] asks for it.
//!
//! ### Roles
//! Nodes are grouped by the [`Role`] their advertised capabilities map to (see [`classify`]).
//! Roles are re-evaluated on every poll; a node whose role changes moves to the end of its new
//! group. Rows come out grouped by role, and within a group in the order nodes were first added.
//!
//! ### Counters
//! Garbage collections, cache evictions, breaker trips, and opened HTTP connections are reported
//! as running totals since the node process started. The [`CounterStore`] remembers the last
//! total per node and [`CounterKind`] and hands out the difference. The first observation of a
//! node has nothing to compare against and yields [`Delta::NoData`], which is displayed as a
//! placeholder rather than as zero.

mod counters;
mod membership;
mod monitor;
mod record;
mod role;
mod utils;

#[rustfmt::skip]
pub use {
  counters::CounterKind,
  counters::CounterStore,
  counters::Delta,
  membership::MembershipTracker,
  membership::ReconcileOutcome,
  monitor::CycleReport,
  monitor::Monitor,
  record::DataStats,
  record::DepartedRecord,
  record::GcSample,
  record::NodeRecord,
  record::PoolSample,
  record::RenderRecord,
  role::classify,
  role::Capabilities,
  role::Role,
  utils::MonitorConfig,
  utils::NodeId,
  utils::DEFAULT_THREAD_POOLS,
};
