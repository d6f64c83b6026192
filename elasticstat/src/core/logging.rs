use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// How much to log. Logs go to stderr; the tables own stdout.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
#[allow(missing_docs)]
pub enum LogLevel {
  Trace,
  Debug,
  Info,
  Warn,
  Error,
  /// Logs only errors, there is nothing more severe to single out.
  Fatal,
  Off,
}
impl LogLevel {
  fn directive(&self) -> &'static str {
    match self {
      LogLevel::Trace => "trace",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error | LogLevel::Fatal => "error",
      LogLevel::Off => "off",
    }
  }
}
impl FromStr for LogLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "trace" => Ok(LogLevel::Trace),
      "debug" => Ok(LogLevel::Debug),
      "info" => Ok(LogLevel::Info),
      "warn" | "warning" => Ok(LogLevel::Warn),
      "error" => Ok(LogLevel::Error),
      "fatal" => Ok(LogLevel::Fatal),
      "off" => Ok(LogLevel::Off),
      other => Err(format!("unknown log level `{}`", other)),
    }
  }
}
impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogLevel::Fatal => f.write_str("fatal"),
      other => f.write_str(other.directive()),
    }
  }
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_logging(level: LogLevel) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

#[test]
fn test_log_level_parse() {
  assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
  assert_eq!("off".parse::<LogLevel>(), Ok(LogLevel::Off));
  assert!("loud".parse::<LogLevel>().is_err());
  assert_eq!(LogLevel::Fatal.to_string(), "fatal");
  assert!(LogLevel::Trace < LogLevel::Error);
}
