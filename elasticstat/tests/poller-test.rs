use elasticstat::cluster::{Monitor, MonitorConfig, NodeId};
use elasticstat::poller::Poller;
use elasticstat::render::{Category, Layout, Renderer};
use elasticstat::testkit::{NodeDocBuilder, ScriptedSource, SnapshotBuilder};
use std::time::Duration;
use tokio_test::block_on;

fn poller(source: ScriptedSource) -> Poller<ScriptedSource, Vec<u8>> {
  let cfg = MonitorConfig::with_pool_list("search,write").unwrap();
  let layout = Layout::new(&Category::ALL, &cfg.thread_pools);
  Poller::new(source, Monitor::new(cfg), Renderer::new(Vec::new(), layout), Duration::ZERO)
}

fn node(name: &str, old_gc: i64) -> NodeDocBuilder {
  NodeDocBuilder::new(name).old_gc(old_gc, 250).pool("search", 1, 0, 0)
}

#[test]
fn fetch_failure_preserves_state() {
  let source = ScriptedSource::new()
    .then(SnapshotBuilder::new("prod").node("a", node("n1", 5)).leader("a").build())
    .then_fail("connection refused")
    .then(SnapshotBuilder::new("prod").node("a", node("n1", 9)).leader("a").build());
  let mut poller = poller(source);

  block_on(poller.run(Some(3))).unwrap();
  assert_eq!(poller.source().fetched(), 3);
  assert_eq!(poller.monitor().cycles(), 2);
  assert!(poller.monitor().tracker().contains(&NodeId::from("a")));

  let out = String::from_utf8(poller.into_output()).unwrap();
  let warning = "unable to fetch cluster state: connection refused";
  assert_eq!(out.lines().filter(|l| l.ends_with(warning)).count(), 1);
  let rows = out.lines().filter(|l| l.starts_with("n1 ")).collect::<Vec<_>>();
  assert_eq!(rows.len(), 2);
  assert!(rows[0].contains("-|250ms"));
  assert!(rows[1].contains("4|250ms"));
  assert!(rows[1].contains("1|0|0"));
  assert!(rows[1].contains("-|-|-"));
}

#[test]
fn every_cycle_prints_both_tables() {
  let source = ScriptedSource::new()
    .then(SnapshotBuilder::new("prod").node("a", node("n1", 1)).build())
    .then(SnapshotBuilder::new("prod").node("b", node("n2", 1)).build());
  let mut poller = poller(source);
  block_on(poller.cycle()).unwrap();
  block_on(poller.cycle()).unwrap();

  let out = String::from_utf8(poller.into_output()).unwrap();
  assert_eq!(out.lines().filter(|l| l.starts_with("cluster ")).count(), 2);
  assert_eq!(out.lines().filter(|l| l.starts_with("prod ")).count(), 2);
  assert_eq!(out.lines().filter(|l| l.starts_with("nodes ")).count(), 2);
  assert!(out.lines().any(|l| l.starts_with("+n2 ")));
  assert!(out.lines().any(|l| l.starts_with("-n1 ") && l.contains("(ALL)")));
  assert!(out.ends_with("\n\n"));
}
