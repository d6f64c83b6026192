//! The polling loop: fetch, reconcile, render, sleep.

use crate::cluster::Monitor;
use crate::core::SnapshotSource;
use crate::error::PollError;
use crate::render::Renderer;
use std::io::Write;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// The clock column's format.
pub const TIME_FORMAT: &str = "%H:%M:%S";

fn timestamp() -> String {
  chrono::Local::now().format(TIME_FORMAT).to_string()
}

/// Drives a [`Monitor`] from a [`SnapshotSource`], one cycle at a time. Cycles never overlap:
/// the next fetch starts only after the previous cycle has been printed.
pub struct Poller<S, W: Write> {
  source: S,
  monitor: Monitor,
  renderer: Renderer<W>,
  interval: Duration,
}
impl<S: SnapshotSource, W: Write> Poller<S, W> {
  /// Creates a poller sleeping `interval` between cycles.
  pub fn new(source: S, monitor: Monitor, renderer: Renderer<W>, interval: Duration) -> Self {
    Poller {
      source: source,
      monitor: monitor,
      renderer: renderer,
      interval: interval,
    }
  }

  /// Runs one cycle. A failed fetch skips reconciliation, leaves the monitor untouched, and
  /// prints a warning line instead of the tables.
  pub async fn cycle(&mut self) -> Result<(), PollError> {
    let fetched = self.source.fetch().await;
    let time = timestamp();
    match fetched {
      Ok(snapshot) => {
        let report = self.monitor.run_cycle(&snapshot.nodes, snapshot.leader.as_ref())?;
        self.renderer.cycle(&snapshot.health, &report.records, &time)?;
      }
      Err(e) => {
        warn!(error = %e, "unable to fetch cluster state");
        self.renderer.warning(&time, &e)?;
      }
    }
    Ok(())
  }

  /// Runs `cycles` cycles, or forever when `None`. Returns early only on an error no later cycle
  /// could recover from.
  pub async fn run(&mut self, cycles: Option<u64>) -> Result<(), PollError> {
    let mut done = 0;
    loop {
      self.cycle().await?;
      done += 1;
      if cycles.map_or(false, |c| done >= c) {
        return Ok(());
      }
      sleep(self.interval).await;
    }
  }

  /// The monitor's tracked state.
  pub fn monitor(&self) -> &Monitor {
    &self.monitor
  }

  /// The source.
  pub fn source(&self) -> &S {
    &self.source
  }

  /// The renderer.
  pub fn renderer(&self) -> &Renderer<W> {
    &self.renderer
  }

  /// Gives back the output.
  pub fn into_output(self) -> W {
    self.renderer.into_inner()
  }
}
