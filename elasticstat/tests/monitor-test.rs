use elasticstat::cluster::{CounterKind, Delta, Monitor, MonitorConfig, NodeId, RenderRecord, Role};
use elasticstat::core::Snapshot;
use elasticstat::render::{Category, Column, Layout};
use elasticstat::testkit::{NodeDocBuilder, SnapshotBuilder};
use maplit::hashset;
use std::collections::HashSet;

fn id(s: &str) -> NodeId {
  NodeId::from(s)
}

fn cycle(monitor: &mut Monitor, snapshot: &Snapshot) -> Vec<RenderRecord> {
  let report = monitor.run_cycle(&snapshot.nodes, snapshot.leader.as_ref()).unwrap();
  monitor.tracker().check_invariants().unwrap();
  report.records
}

fn full_node(name: &str, old_gc: i64) -> NodeDocBuilder {
  NodeDocBuilder::new(name)
    .attribute("data", true)
    .attribute("master", true)
    .old_gc(old_gc, 1500)
    .young_gc(40, 300)
    .fielddata(2, 0)
    .http(3, 50)
}

#[test]
fn end_to_end_restart_under_same_name() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let layout = Layout::new(&Category::ALL, &monitor.config().thread_pools);

  let first = SnapshotBuilder::new("prod").node("id1", full_node("n1", 10)).leader("id1").build();
  let records = cycle(&mut monitor, &first);
  assert_eq!(records.len(), 1);
  let node = records[0].node().unwrap();
  assert_eq!(Column::Name.cell(node), "n1");
  assert_eq!(Column::Role.cell(node), "ALL*");
  for kind in CounterKind::ALL.iter() {
    assert_eq!(node.counter(*kind), Some(Delta::NoData));
  }
  assert_eq!(Column::OldGc.cell(node), "-|1500ms");
  let row = layout.row(node);
  assert!(row.starts_with("n1 "));
  assert!(row.contains("-|-|-"));

  let second = SnapshotBuilder::new("prod").node("id1", full_node("n1", 13)).leader("id1").build();
  let records = cycle(&mut monitor, &second);
  let node = records[0].node().unwrap();
  assert_eq!(Column::Role.cell(node), "ALL*");
  assert_eq!(node.counter(CounterKind::OldGcCount), Some(Delta::Value(3)));
  assert!(Column::OldGc.cell(node).starts_with("3|"));
  assert!(Column::OldGc.cell(node).ends_with("ms"));
  assert_eq!(node.counter(CounterKind::YoungGcCount), Some(Delta::Value(0)));

  let third = SnapshotBuilder::new("prod").node("id2", full_node("n1", 0)).build();
  let records = cycle(&mut monitor, &third);
  assert_eq!(records.len(), 1);
  let node = records[0].node().unwrap();
  assert_eq!(node.id, id("id2"));
  assert_eq!(Column::Name.cell(node), "+n1");
  assert_eq!(Column::Role.cell(node), "ALL");
  assert_eq!(node.counter(CounterKind::OldGcCount), Some(Delta::NoData));
  assert!(!monitor.tracker().contains(&id("id1")));
  assert!(!monitor.counters().tracks(&id("id1")));
}

#[test]
fn departed_node_persists_until_replaced() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let both = SnapshotBuilder::new("prod")
    .node("a", NodeDocBuilder::new("node-7").attribute("master", false))
    .node("b", NodeDocBuilder::new("node-8").attribute("master", false))
    .build();
  cycle(&mut monitor, &both);

  let only_b = SnapshotBuilder::new("prod")
    .node("b", NodeDocBuilder::new("node-8").attribute("master", false))
    .build();
  for _ in 0..3 {
    let records = cycle(&mut monitor, &only_b);
    match &records[0] {
      RenderRecord::Departed(d) => {
        assert_eq!(d.name, "node-7");
        assert_eq!(d.role, Role::Data);
      }
      other => panic!("expected a departed row, got {:?}", other),
    }
    assert_eq!(records.len(), 2);
  }

  let replaced = SnapshotBuilder::new("prod")
    .node("b", NodeDocBuilder::new("node-8").attribute("master", false))
    .node("c", NodeDocBuilder::new("node-7").attribute("master", false))
    .build();
  let records = cycle(&mut monitor, &replaced);
  assert!(records.iter().all(|r| r.node().is_some()));
  let members = monitor.tracker().membership().into_iter().collect::<HashSet<_>>();
  assert_eq!(members, hashset! {id("b"), id("c")});
}

#[test]
fn departed_node_returning_verbatim() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let present = SnapshotBuilder::new("prod")
    .node("a", NodeDocBuilder::new("n1").http(1, 10))
    .build();
  cycle(&mut monitor, &present);
  cycle(&mut monitor, &SnapshotBuilder::new("prod").build());
  let back = SnapshotBuilder::new("prod")
    .node("a", NodeDocBuilder::new("n1").http(1, 15))
    .build();
  let records = cycle(&mut monitor, &back);
  let node = records[0].node().unwrap();
  assert!(!node.joined);
  assert_eq!(node.counter(CounterKind::HttpOpened), Some(Delta::Value(5)));
}

#[test]
fn role_change_moves_groups() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let data = SnapshotBuilder::new("prod")
    .node("a", NodeDocBuilder::new("n1").attribute("master", false))
    .node("b", NodeDocBuilder::new("n2"))
    .build();
  cycle(&mut monitor, &data);
  assert_eq!(monitor.tracker().group(Role::Data), vec![id("a")]);

  let all = SnapshotBuilder::new("prod")
    .node("a", NodeDocBuilder::new("n1").attribute("master", true))
    .node("b", NodeDocBuilder::new("n2"))
    .build();
  let records = cycle(&mut monitor, &all);
  assert_eq!(monitor.tracker().group(Role::Data), Vec::<NodeId>::new());
  assert_eq!(monitor.tracker().group(Role::All), vec![id("b"), id("a")]);
  let ids = records.iter().map(|r| r.id().as_str()).collect::<Vec<_>>();
  assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn rows_grouped_by_role() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let snapshot = SnapshotBuilder::new("prod")
    .node("r", NodeDocBuilder::new("router").attribute("data", false).attribute("master", false))
    .node("d1", NodeDocBuilder::new("data-1").attribute("master", false))
    .node("m", NodeDocBuilder::new("master").attribute("data", false))
    .node("d2", NodeDocBuilder::new("data-2").attribute("master", false))
    .node("x", NodeDocBuilder::new("odd").set(&["attributes", "data"], "maybe"))
    .node("a", NodeDocBuilder::new("all"))
    .build();
  let records = cycle(&mut monitor, &snapshot);
  let roles = records.iter().map(|r| r.role()).collect::<Vec<_>>();
  assert_eq!(
    roles,
    vec![Role::All, Role::Master, Role::Data, Role::Data, Role::Router, Role::Unknown]
  );
  assert_eq!(records[2].id(), &id("d1"));
  assert_eq!(records[3].id(), &id("d2"));
}

#[test]
fn forget_after_drops_departed_nodes() {
  let cfg = MonitorConfig {
    forget_after: Some(2),
    ..MonitorConfig::default()
  };
  let mut monitor = Monitor::new(cfg);
  let both = SnapshotBuilder::new("prod")
    .node("a", NodeDocBuilder::new("n1").fielddata(1, 1))
    .node("b", NodeDocBuilder::new("n2"))
    .build();
  cycle(&mut monitor, &both);
  let only_b = SnapshotBuilder::new("prod").node("b", NodeDocBuilder::new("n2")).build();
  assert_eq!(cycle(&mut monitor, &only_b).len(), 2);
  assert_eq!(cycle(&mut monitor, &only_b).len(), 1);
  assert!(!monitor.tracker().contains(&id("a")));
  assert!(!monitor.counters().tracks(&id("a")));
}
