use crate::error::ConfigError;
use crate::render::Column;
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

/// Spaces between two categories in a row.
const CATEGORY_GAP: usize = 3;

/// A group of node table columns that is shown or hidden as a whole. [`Category::General`], the
/// name and role, leads every layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
  /// Name and role.
  General,
  /// Load averages and memory.
  Os,
  /// Heap and garbage collection.
  Jvm,
  /// One column per configured thread pool.
  Threads,
  /// Fielddata evictions and breaker trips.
  Fielddata,
  /// HTTP and transport connections.
  Connections,
  /// Merges, throttling, disk and documents.
  DataNodes,
}
impl Category {
  /// Every category, in display order.
  pub const ALL: [Category; 7] = [
    Category::General,
    Category::Os,
    Category::Jvm,
    Category::Threads,
    Category::Fielddata,
    Category::Connections,
    Category::DataNodes,
  ];

  fn name(&self) -> &'static str {
    match self {
      Category::General => "general",
      Category::Os => "os",
      Category::Jvm => "jvm",
      Category::Threads => "threads",
      Category::Fielddata => "fielddata",
      Category::Connections => "connections",
      Category::DataNodes => "data_nodes",
    }
  }

  /// Parses a comma separated list as typed on the command line. `all` selects every category;
  /// otherwise [`Category::General`] comes first, then the listed ones in the order given.
  pub fn parse_list(list: &str) -> Result<Vec<Category>, ConfigError> {
    let names = list.split(',').map(str::trim).filter(|c| !c.is_empty()).collect_vec();
    if names.is_empty() || names.contains(&"all") {
      return Ok(Category::ALL.to_vec());
    }
    let mut categories = vec![Category::General];
    for name in names {
      categories.push(name.parse()?);
    }
    Ok(categories.into_iter().unique().collect())
  }

  /// This category's columns, each with the spaces printed before it. The first column is
  /// separated from whatever precedes it by the category gap.
  pub fn columns(&self, thread_pools: &[String]) -> Vec<(usize, Column)> {
    let mut columns = match self {
      Category::General => vec![(0, Column::Name), (1, Column::Role)],
      Category::Os => vec![(0, Column::Load), (1, Column::Mem)],
      Category::Jvm => vec![
        (0, Column::Heap),
        (2, Column::OldGcSize),
        (1, Column::OldGc),
        (1, Column::YoungGc),
      ],
      Category::Threads => thread_pools
        .iter()
        .map(|pool| (1, Column::ThreadPool(pool.clone())))
        .collect(),
      Category::Fielddata => vec![(0, Column::Fielddata)],
      Category::Connections => vec![(0, Column::HttpConn), (1, Column::TransportConn)],
      Category::DataNodes => vec![
        (0, Column::MergeTime),
        (1, Column::StoreThrottle),
        (1, Column::Disk),
        (2, Column::Docs),
      ],
    };
    if *self != Category::General {
      if let Some((gap, _)) = columns.first_mut() {
        *gap = CATEGORY_GAP;
      }
    }
    columns
  }
}
impl FromStr for Category {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_ascii_lowercase().replace('-', "_");
    Category::ALL
      .iter()
      .find(|c| c.name() == lower)
      .copied()
      .ok_or_else(|| ConfigError::Category(s.to_string()))
  }
}
impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[test]
fn test_parse_list() {
  assert_eq!(Category::parse_list("all").unwrap(), Category::ALL.to_vec());
  assert_eq!(Category::parse_list("").unwrap(), Category::ALL.to_vec());
  assert_eq!(
    Category::parse_list("jvm, Data-Nodes,general,jvm").unwrap(),
    vec![Category::General, Category::Jvm, Category::DataNodes]
  );
  assert!(matches!(
    Category::parse_list("os,disk"),
    Err(ConfigError::Category(c)) if c == "disk"
  ));
}

#[test]
fn test_category_gaps() {
  let pools = vec!["index".to_string(), "get".to_string()];
  assert_eq!(
    Category::Threads.columns(&pools),
    vec![
      (3, Column::ThreadPool("index".to_string())),
      (1, Column::ThreadPool("get".to_string())),
    ]
  );
  assert!(Category::Threads.columns(&[]).is_empty());
  assert_eq!(Category::General.columns(&pools)[0], (0, Column::Name));
  assert_eq!(Category::Os.columns(&pools)[0], (3, Column::Load));
}
