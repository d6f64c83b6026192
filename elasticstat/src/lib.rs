#![warn(missing_docs)]

//! `elasticstat` is a terminal performance overview for Elasticsearch clusters, in the spirit of
//! `vmstat` and `mongostat`. Every interval it polls the cluster's status API and prints one row
//! of cluster health and one row per node.
//!
//! The interesting part lives in [`cluster`]: a [`Monitor`](crate::cluster::Monitor) remembers
//! which nodes it has seen across polls, notices nodes joining, leaving, or restarting under a new
//! identifier, follows role changes, and turns the cumulative counters each node reports into
//! per-interval deltas. [`core`] fetches and models the raw documents, [`render`] turns records
//! into table rows.

pub mod cluster;
pub mod core;
pub mod error;
pub mod poller;
pub mod render;
pub mod testkit;
