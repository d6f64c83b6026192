use elasticstat::cluster::{Monitor, MonitorConfig};
use elasticstat::render::{Category, Column, Layout, Renderer};
use elasticstat::testkit::{NodeDocBuilder, SnapshotBuilder};

#[test]
fn data_only_columns_blank_for_other_roles() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let snapshot = SnapshotBuilder::new("prod")
    .node(
      "d",
      NodeDocBuilder::new("data")
        .attribute("master", false)
        .set(&["indices", "docs", "count"], 42)
        .set(&["indices", "docs", "deleted"], 2)
        .set(&["indices", "merges", "total_time"], "3.1m")
        .set(&["indices", "store", "throttle_time"], "0s"),
    )
    .node(
      "m",
      NodeDocBuilder::new("master")
        .attribute("data", false)
        .set(&["indices", "docs", "count"], 7),
    )
    .build();
  let report = monitor.run_cycle(&snapshot.nodes, None).unwrap();
  let master = report.records[0].node().unwrap();
  let data = report.records[1].node().unwrap();
  assert_eq!(Column::Docs.cell(master), "-|-");
  assert_eq!(Column::MergeTime.cell(master), "-");
  assert_eq!(Column::Docs.cell(data), "42|2");
  assert_eq!(Column::MergeTime.cell(data), "3.1m");
  assert_eq!(Column::StoreThrottle.cell(data), "0s");
}

#[test]
fn cycle_output_layout() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let layout = Layout::new(&Category::ALL, &monitor.config().thread_pools);
  let snapshot = SnapshotBuilder::new("prod")
    .node("a", NodeDocBuilder::new("n1").load(&[0.5, 0.25, 1.0]).http(3, 10))
    .leader("a")
    .build();
  let report = monitor.run_cycle(&snapshot.nodes, snapshot.leader.as_ref()).unwrap();
  let mut renderer = Renderer::new(Vec::new(), layout);
  renderer.cycle(&snapshot.health, &report.records, "09:15:00").unwrap();

  let out = String::from_utf8(renderer.into_inner()).unwrap();
  let lines = out.lines().collect::<Vec<_>>();
  assert_eq!(lines.len(), 6);
  assert!(lines[0].starts_with("cluster"));
  assert!(lines[1].starts_with("prod"));
  assert!(lines[1].ends_with("09:15:00"));
  assert_eq!(lines[2], "");
  assert!(lines[3].starts_with("nodes"));
  let general_os = format!("{:<24} {:<6}   {:>18}", "n1", "ALL*", "0.50/0.25/1.00");
  assert!(lines[4].starts_with(&general_os));
  assert!(lines[4].contains("3|-"));
  assert_eq!(lines[5], "");
}

#[test]
fn selected_categories_only() {
  let mut monitor = Monitor::new(MonitorConfig::default());
  let categories = Category::parse_list("connections").unwrap();
  let layout = Layout::new(&categories, &monitor.config().thread_pools);
  let snapshot = SnapshotBuilder::new("prod")
    .node("a", NodeDocBuilder::new("n1").load(&[0.5, 0.25, 1.0]).http(3, 10))
    .build();
  let report = monitor.run_cycle(&snapshot.nodes, None).unwrap();
  let row = layout.record(&report.records[0]);
  assert_eq!(layout.headings(), format!("{:<24} {:<6}    hconn  tconn", "nodes", "role"));
  assert!(row.starts_with(&format!("{:<24} {:<6}   {:>6}", "n1", "ALL", "3|-")));
  assert!(!row.contains("0.50"));
}
