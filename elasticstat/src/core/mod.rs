//! Where the numbers come from.
//!
//! A [`SnapshotSource`] hands out one [`Snapshot`] per cycle: the cluster's health record, one
//! raw [`NodeDoc`] per live node, and the identity of the elected master. [`HttpSource`] reads
//! them from the status API of one of a list of [`Endpoint`]s, failing over to the next one when
//! a fetch goes wrong. Node documents are kept as raw JSON; nothing in them is required, and
//! every accessor on [`NodeDoc`] yields `None` for what is missing.
//!
//! Logging goes through `tracing`. [`init_logging`] installs a subscriber writing to stderr,
//! filtered by `RUST_LOG` or else the given [`LogLevel`].

mod logging;
mod remoting;
mod snapshot;
mod source;

#[rustfmt::skip]
pub use {
  logging::init_logging,
  logging::LogLevel,
  remoting::Endpoint,
  remoting::Host,
  remoting::Scheme,
  remoting::DEFAULT_PORT,
  snapshot::ClusterHealth,
  snapshot::HealthStatus,
  snapshot::NodeDoc,
  snapshot::NodeDocs,
  snapshot::Snapshot,
  source::HttpSource,
  source::SnapshotSource,
  source::SourceConfig,
};
