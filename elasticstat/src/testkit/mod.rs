//! Stand-ins for a live cluster: a [`SnapshotSource`](crate::core::SnapshotSource) that replays
//! a script, and builders for node documents and snapshots.

mod builders;
mod scripted;

#[rustfmt::skip]
pub use {
  builders::NodeDocBuilder,
  builders::SnapshotBuilder,
  scripted::ScriptedSource,
};
