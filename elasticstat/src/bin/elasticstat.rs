//! Command line performance overview of an Elasticsearch cluster.

use anyhow::Context;
use clap::{ArgAction, Parser};
use elasticstat::cluster::{Monitor, MonitorConfig};
use elasticstat::core::{init_logging, Endpoint, HttpSource, LogLevel, SourceConfig, DEFAULT_PORT};
use elasticstat::poller::Poller;
use elasticstat::render::{Category, Layout, Renderer};
use std::io;
use std::time::Duration;
use tracing::{error, info};

const PROMPT: &str = "PROMPT";
const PASSWORD_ENV: &str = "ELASTICSTAT_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "elasticstat")]
#[command(about = "Command line performance overview of an Elasticsearch cluster")]
#[command(long_about = None)]
#[command(disable_help_flag = true)]
struct Args {
  /// Print help.
  #[arg(long, action = ArgAction::Help)]
  help: Option<bool>,
  /// Comma separated hosts to poll, each `host[:port]`. The next host is tried when one fails.
  #[arg(short = 'h', long = "host", default_value = "localhost")]
  hosts: String,
  /// Port for hosts given without one.
  #[arg(long, default_value_t = DEFAULT_PORT)]
  port: u16,
  /// Username for basic authentication.
  #[arg(short = 'u', long)]
  username: Option<String>,
  /// Password for basic authentication. Without a value it is read from ELASTICSTAT_PASSWORD,
  /// or else prompted for on the terminal without echo.
  #[arg(short = 'p', long, num_args = 0..=1, default_missing_value = PROMPT)]
  password: Option<String>,
  /// Comma separated statistic categories to show: general, os, jvm, threads, fielddata,
  /// connections, data_nodes, or all. Name and role are always shown.
  #[arg(short = 'c', long, default_value = "all")]
  categories: String,
  /// Comma separated thread pools to show.
  #[arg(short = 'T', long = "threadpools", default_value = "index,search,bulk,get,merge")]
  thread_pools: String,
  /// Forget a departed node after this many cycles without it.
  #[arg(long)]
  forget_after: Option<u32>,
  /// Request timeout in seconds.
  #[arg(long)]
  timeout: Option<u64>,
  /// trace, debug, info, warn, error, fatal or off. RUST_LOG takes precedence.
  #[arg(long, default_value = "warn")]
  log_level: LogLevel,
  /// Seconds between polls.
  #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
  delay_interval: u64,
}

/// Settles the password: a given value is kept, `PROMPT` takes `env` when set and asks `prompt`
/// otherwise.
fn resolve_password<F>(
  password: Option<String>,
  env: Option<String>,
  prompt: F,
) -> io::Result<Option<String>>
where
  F: FnOnce() -> io::Result<String>,
{
  match password {
    Some(p) if p == PROMPT => match env {
      Some(env) => Ok(Some(env)),
      None => prompt().map(Some),
    },
    other => Ok(other),
  }
}

async fn read_password(password: Option<String>) -> anyhow::Result<Option<String>> {
  let env = std::env::var(PASSWORD_ENV).ok();
  let resolved = tokio::task::spawn_blocking(move || {
    resolve_password(password, env, || rpassword::prompt_password("Password: "))
  })
  .await?;
  resolved.context("could not read password from the terminal")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  init_logging(args.log_level);

  let mut monitor_cfg = MonitorConfig::with_pool_list(&args.thread_pools)
    .context("invalid thread pool list")?;
  monitor_cfg.forget_after = args.forget_after;
  let monitor_cfg = monitor_cfg.checked().context("invalid --forget-after")?;

  let source_cfg = SourceConfig {
    hosts: Endpoint::parse_list(&args.hosts, args.port).context("invalid host list")?,
    username: args.username,
    password: read_password(args.password).await?,
    timeout_secs: args.timeout,
  }
  .checked()
  .context("invalid connection settings")?;
  info!(
    hosts = %source_cfg.hosts.iter().map(|h| h.to_string()).collect::<Vec<_>>().join(","),
    interval = args.delay_interval,
    "starting"
  );

  let categories = Category::parse_list(&args.categories).context("invalid category list")?;
  let layout = Layout::new(&categories, &monitor_cfg.thread_pools);
  let source = HttpSource::new(source_cfg).context("could not set up HTTP client")?;
  let mut poller = Poller::new(
    source,
    Monitor::new(monitor_cfg),
    Renderer::new(std::io::stdout(), layout),
    Duration::from_secs(args.delay_interval),
  );

  tokio::select! {
    res = poller.run(None) => {
      if let Err(e) = &res {
        error!(error = %e, "stopping");
      }
      res.context("monitor stopped")?;
    }
    res = tokio::signal::ctrl_c() => {
      res.context("could not listen for interrupt")?;
      info!("interrupted");
    }
  }
  Ok(())
}

#[test]
fn test_resolve_password() {
  let never = || -> io::Result<String> { panic!("prompted") };
  assert_eq!(resolve_password(None, Some("env".into()), never).unwrap(), None);
  assert_eq!(
    resolve_password(Some("given".into()), Some("env".into()), never).unwrap(),
    Some("given".to_string())
  );
  assert_eq!(
    resolve_password(Some(PROMPT.into()), Some("env".into()), never).unwrap(),
    Some("env".to_string())
  );
  assert_eq!(
    resolve_password(Some(PROMPT.into()), None, || Ok("typed".into())).unwrap(),
    Some("typed".to_string())
  );
  let failed = resolve_password(Some(PROMPT.into()), None, || {
    Err(io::Error::new(io::ErrorKind::NotFound, "no tty"))
  });
  assert!(failed.is_err());
}
