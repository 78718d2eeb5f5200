mod cache;
mod commands;
mod config;
mod error;
mod logging;
mod search;
mod service;
mod snapshot;
mod source;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

use crate::commands::ListArgs;

#[derive(Parser, Debug)]
#[command(name = "brewcache")]
#[command(about = "Brewery listings with a short-lived cache and an offline snapshot")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./brewcache.yaml or $XDG_CONFIG_HOME/brewcache/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Log level (error, warn, info, debug, trace)
  #[arg(long, default_value = "warn", global = true)]
  log_level: String,

  /// Write logs to this file instead of stderr
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch, search, and sort breweries
  List(ListArgs),
  /// Repeat a query on an interval, reusing the in-memory cache
  Watch {
    #[command(flatten)]
    list: ListArgs,
    /// Seconds between queries
    #[arg(short, long, default_value_t = 30)]
    interval: u64,
    /// Stop after this many queries
    #[arg(short = 'n', long)]
    count: Option<u32>,
    /// Drop the cache before every query
    #[arg(long)]
    refresh: bool,
  },
  /// Show the state of the offline snapshot
  Snapshot,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init(&args.log_level, args.log_file.as_deref())?;

  let config = config::Config::load(args.config.as_deref())?;
  let service = commands::build_service(&config)?;

  match args.command {
    Command::List(list) => commands::list(&service, &list).await,
    Command::Watch {
      list,
      interval,
      count,
      refresh,
    } => commands::watch(&service, &list, interval, count, refresh).await,
    Command::Snapshot => commands::snapshot(&service).await,
  }
}
