use crate::core::{Snapshot, SnapshotSource};
use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Replays snapshots and failures in order. Once the script runs out every fetch fails.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
  script: VecDeque<Result<Snapshot, String>>,
  fetched: usize,
}
impl ScriptedSource {
  /// An empty script.
  pub fn new() -> ScriptedSource {
    ScriptedSource::default()
  }

  /// Appends a snapshot.
  pub fn then(mut self, snapshot: Snapshot) -> ScriptedSource {
    self.script.push_back(Ok(snapshot));
    self
  }

  /// Appends a failed fetch.
  pub fn then_fail<S: Into<String>>(mut self, msg: S) -> ScriptedSource {
    self.script.push_back(Err(msg.into()));
    self
  }

  /// Steps not yet replayed.
  pub fn remaining(&self) -> usize {
    self.script.len()
  }

  /// Fetches attempted so far.
  pub fn fetched(&self) -> usize {
    self.fetched
  }
}
#[async_trait]
impl SnapshotSource for ScriptedSource {
  async fn fetch(&mut self) -> Result<Snapshot, FetchError> {
    self.fetched += 1;
    match self.script.pop_front() {
      Some(Ok(snapshot)) => Ok(snapshot),
      Some(Err(msg)) => Err(FetchError::Injected(msg)),
      None => Err(FetchError::Injected("script exhausted".to_string())),
    }
  }
}

#[cfg(test)]
use tokio_test::block_on;

#[test]
fn test_scripted_source() {
  let mut source = ScriptedSource::new().then(Snapshot::default()).then_fail("boom");
  assert_eq!(source.remaining(), 2);
  assert!(block_on(source.fetch()).is_ok());
  match block_on(source.fetch()) {
    Err(FetchError::Injected(msg)) => assert_eq!(msg, "boom"),
    other => panic!("unexpected {:?}", other.map(|_| ())),
  }
  assert!(block_on(source.fetch()).is_err());
  assert_eq!(source.fetched(), 3);
  assert_eq!(source.remaining(), 0);
}
