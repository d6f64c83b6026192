use crate::cluster::{DepartedRecord, NodeRecord, RenderRecord};
use crate::core::ClusterHealth;
use crate::render::column::PLACEHOLDER;
use crate::render::{Align, Category, Column};
use std::fmt::Display;
use std::io::{self, Write};

const DEPARTED_NOTE: &str = "(No data received, node may have left cluster)";

/// The node table's columns, resolved once from the selected categories and the configured
/// thread pools. Each column carries the number of spaces printed before it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
  columns: Vec<(usize, Column)>,
}
impl Layout {
  /// Lays out the table with the columns of each of `categories`, in that order. The threads
  /// category gets one column per pool in `thread_pools`.
  pub fn new(categories: &[Category], thread_pools: &[String]) -> Layout {
    let mut columns = categories.iter().flat_map(|c| c.columns(thread_pools)).collect::<Vec<_>>();
    if let Some((gap, _)) = columns.first_mut() {
      *gap = 0;
    }
    Layout { columns: columns }
  }

  /// The columns, in display order.
  pub fn columns(&self) -> impl Iterator<Item = &Column> {
    self.columns.iter().map(|(_, c)| c)
  }

  fn line<F: Fn(&Column) -> String>(&self, cell: F) -> String {
    let mut line = String::new();
    for (gap, column) in &self.columns {
      line.extend(std::iter::repeat(' ').take(*gap));
      line.push_str(&column.align().pad(&cell(column), column.width()));
    }
    line.trim_end().to_string()
  }

  /// The heading row.
  pub fn headings(&self) -> String {
    self.line(|c| c.heading().to_string())
  }

  /// The row for a live node.
  pub fn row(&self, node: &NodeRecord) -> String {
    self.line(|c| c.cell(node))
  }

  /// The row for a node that did not answer: its name struck with `-`, and the role it was last
  /// seen with.
  pub fn departed(&self, node: &DepartedRecord) -> String {
    format!(
      "{} {} {}",
      Column::Name.align().pad(&format!("-{}", node.name), Column::Name.width()),
      Column::Role.align().pad(&format!("({})", node.role), Column::Role.width()),
      DEPARTED_NOTE
    )
  }

  /// The row for any record.
  pub fn record(&self, record: &RenderRecord) -> String {
    match record {
      RenderRecord::Node(node) => self.row(node),
      RenderRecord::Departed(node) => self.departed(node),
    }
  }
}

const HEALTH_COLUMNS: [(&str, usize, Align); 8] = [
  ("cluster", 33, Align::Left),
  ("status", 6, Align::Left),
  ("shards", 6, Align::Right),
  ("pri", 4, Align::Right),
  ("relo", 4, Align::Right),
  ("init", 4, Align::Right),
  ("unassign", 8, Align::Right),
  ("pending tasks", 13, Align::Right),
];

fn health_line(cells: [String; 8], time: &str) -> String {
  let mut line = HEALTH_COLUMNS
    .iter()
    .zip(cells.iter())
    .map(|((_, width, align), cell)| align.pad(cell, *width))
    .collect::<Vec<_>>()
    .join(" ");
  line.push_str("  ");
  line.push_str(&Align::Left.pad(time, 8));
  line.trim_end().to_string()
}

/// The heading and value rows of the cluster header.
pub fn health_rows(health: &ClusterHealth, time: &str) -> [String; 2] {
  let num = |n: Option<u64>| n.map_or_else(|| PLACEHOLDER.to_string(), |n| n.to_string());
  let headings = HEALTH_COLUMNS.map(|(h, _, _)| h.to_string());
  let values = [
    health.cluster_name.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
    health.status.to_string(),
    num(health.active_shards),
    num(health.active_primary_shards),
    num(health.relocating_shards),
    num(health.initializing_shards),
    num(health.unassigned_shards),
    num(health.number_of_pending_tasks),
  ];
  [health_line(headings, "time"), health_line(values, time)]
}

/// Writes each cycle's tables to `W`.
pub struct Renderer<W: Write> {
  out: W,
  layout: Layout,
}
impl<W: Write> Renderer<W> {
  /// Creates a renderer writing to `out`.
  pub fn new(out: W, layout: Layout) -> Renderer<W> {
    Renderer {
      out: out,
      layout: layout,
    }
  }

  /// Prints the cluster header and the node table for one cycle, each followed by a blank line.
  pub fn cycle(
    &mut self,
    health: &ClusterHealth,
    records: &[RenderRecord],
    time: &str,
  ) -> io::Result<()> {
    for line in health_rows(health, time).iter() {
      writeln!(self.out, "{}", line)?;
    }
    writeln!(self.out)?;
    writeln!(self.out, "{}", self.layout.headings())?;
    for record in records {
      writeln!(self.out, "{}", self.layout.record(record))?;
    }
    writeln!(self.out)?;
    self.out.flush()
  }

  /// Prints the line shown instead of the tables when a cycle could not be fetched.
  pub fn warning(&mut self, time: &str, err: &dyn Display) -> io::Result<()> {
    writeln!(self.out, "{} unable to fetch cluster state: {}", time, err)?;
    self.out.flush()
  }

  /// The layout rows are printed with.
  pub fn layout(&self) -> &Layout {
    &self.layout
  }

  /// The output written so far.
  pub fn get_ref(&self) -> &W {
    &self.out
  }

  /// Gives back the output.
  pub fn into_inner(self) -> W {
    self.out
  }
}

#[cfg(test)]
use crate::cluster::{NodeId, Role, DEFAULT_THREAD_POOLS};
#[cfg(test)]
use crate::core::HealthStatus;

#[cfg(test)]
fn default_layout() -> Layout {
  let pools = DEFAULT_THREAD_POOLS.iter().map(|p| p.to_string()).collect::<Vec<_>>();
  Layout::new(&Category::ALL, &pools)
}

#[test]
fn test_layout_columns() {
  let layout = default_layout();
  let pools = layout
    .columns()
    .filter_map(|c| match c {
      Column::ThreadPool(p) => Some(p.as_str()),
      _ => None,
    })
    .collect::<Vec<_>>();
  assert_eq!(pools, DEFAULT_THREAD_POOLS.to_vec());
  assert_eq!(layout.columns().next(), Some(&Column::Name));
  assert_eq!(layout.columns().last(), Some(&Column::Docs));
}

#[test]
fn test_headings() {
  let headings = default_layout().headings();
  let general_os_jvm =
    format!("{:<24} {:<6}   {:>18}  mem   heap  old sz", "nodes", "role", "load");
  assert!(headings.starts_with(&general_os_jvm));
  assert!(headings.contains("   index    search   bulk     get      merge      fde|fdt    hconn"));
  assert!(headings.ends_with("  merges   idx st  disk  docs"));
}

#[test]
fn test_category_selection() {
  let pools = DEFAULT_THREAD_POOLS.iter().map(|p| p.to_string()).collect::<Vec<_>>();
  let layout = Layout::new(&Category::parse_list("jvm").unwrap(), &pools);
  assert_eq!(
    layout.columns().cloned().collect::<Vec<_>>(),
    vec![
      Column::Name,
      Column::Role,
      Column::Heap,
      Column::OldGcSize,
      Column::OldGc,
      Column::YoungGc
    ]
  );
  assert_eq!(
    layout.headings(),
    format!("{:<24} {:<6}   heap  old sz   old gc   young gc", "nodes", "role")
  );
}

#[test]
fn test_departed_row() {
  let row = default_layout().departed(&DepartedRecord {
    id: NodeId::from("gone"),
    name: "n7".to_string(),
    role: Role::Data,
  });
  assert_eq!(row, format!("{:<24} (DATA) {}", "-n7", DEPARTED_NOTE));
}

#[test]
fn test_health_rows() {
  let health = ClusterHealth {
    cluster_name: Some("prod".to_string()),
    status: HealthStatus::Green,
    active_shards: Some(10),
    unassigned_shards: Some(0),
    ..ClusterHealth::default()
  };
  let [headings, values] = health_rows(&health, "12:00:00");
  assert!(headings.starts_with(&format!("{:<33} status shards  pri", "cluster")));
  assert!(headings.ends_with("pending tasks  time"));
  assert!(values.starts_with(&format!("{:<33} green      10    -", "prod")));
  assert!(values.ends_with("-  12:00:00"));
}

#[test]
fn test_renderer_warning() {
  let mut renderer = Renderer::new(Vec::new(), default_layout());
  renderer.warning("12:00:00", &"connection refused").unwrap();
  let out = String::from_utf8(renderer.into_inner()).unwrap();
  assert_eq!(out, "12:00:00 unable to fetch cluster state: connection refused\n");
}
