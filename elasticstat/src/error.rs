//! Error types shared by the library and the binary.

use crate::cluster::{NodeId, Role};
use thiserror::Error;

/// A snapshot could not be fetched this cycle. Always recoverable: the cycle is skipped and
/// tracked state is left untouched.
#[derive(Error, Debug)]
pub enum FetchError {
  /// The request never produced a response (connection refused, timeout, TLS...).
  #[error("transport error talking to {url}: {source}")]
  Transport {
    /// The URL being requested.
    url: String,
    /// The underlying client error.
    #[source]
    source: reqwest::Error,
  },

  /// The server answered with a non-success status.
  #[error("{url} returned HTTP {status}")]
  Status {
    /// The URL being requested.
    url: String,
    /// The HTTP status code.
    status: u16,
  },

  /// The response body was not the JSON document we expected.
  #[error("could not decode response from {url}: {source}")]
  Decode {
    /// The URL being requested.
    url: String,
    /// The underlying decode error.
    #[source]
    source: serde_json::Error,
  },

  /// The source has nothing to fetch from.
  #[error("no hosts configured")]
  NoHosts,

  /// A scripted source injected this failure.
  #[error("{0}")]
  Injected(String),
}

/// The tracked membership no longer satisfies its structural invariants. This is a bug in
/// reconciliation, never a property of the monitored cluster, so the binary aborts on it.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
  /// An identity sits in more than one role group.
  #[error("node {id} is in role groups {first} and {second}")]
  DuplicateGroup {
    /// The offending identity.
    id: NodeId,
    /// One group holding it.
    first: Role,
    /// Another group holding it.
    second: Role,
  },

  /// An identity is in a role group but not in the membership set, or the other way around.
  #[error("node {id} is tracked inconsistently: {detail}")]
  Untracked {
    /// The offending identity.
    id: NodeId,
    /// What is inconsistent about it.
    detail: &'static str,
  },

  /// The membership set records a role other than the group the identity sits in.
  #[error("node {id} is recorded as {recorded} but sits in group {grouped}")]
  RoleMismatch {
    /// The offending identity.
    id: NodeId,
    /// The role in the membership set.
    recorded: Role,
    /// The group the identity sits in.
    grouped: Role,
  },
}

/// Invalid monitor configuration or command line input.
#[derive(Error, Debug)]
pub enum ConfigError {
  /// A `host[:port]` entry could not be parsed.
  #[error("invalid host `{0}`")]
  Host(String),

  /// A node table category name was not recognized.
  #[error("unknown category `{0}`")]
  Category(String),

  /// A field failed validation.
  #[error("invalid configuration: {0}")]
  Invalid(#[from] validator::ValidationErrors),

  /// The HTTP client could not be built.
  #[error("could not build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

/// A cycle could not be completed. Fetch failures are not among these: they are reported and
/// the loop carries on.
#[derive(Error, Debug)]
pub enum PollError {
  /// Reconciliation broke the membership invariants.
  #[error(transparent)]
  Invariant(#[from] InvariantViolation),

  /// Writing the tables failed.
  #[error("could not write output: {0}")]
  Output(#[from] std::io::Error),
}
