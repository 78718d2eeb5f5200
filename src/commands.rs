use clap::Args;
use color_eyre::Result;
use std::time::Duration;
use tracing::{error, info};

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::service::{DataOrigin, QueryResult, RecordQuery, RecordService};
use crate::snapshot::FileSnapshotStore;
use crate::source::{DisplayRecord, HttpFetcher, SourceRecord};

/// The service as wired up by the binary.
pub type BreweryService = RecordService<HttpFetcher, MemoryCache<Vec<SourceRecord>>, FileSnapshotStore>;

/// Query options shared by `list` and `watch`
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
  /// Field to sort by: name, city, or phone (anything else sorts by city)
  #[arg(short, long, default_value = "city")]
  pub sort_by: String,

  /// Sort in descending order
  #[arg(short, long)]
  pub descending: bool,

  /// Case-insensitive match against name, city, or phone
  #[arg(short = 'q', long)]
  pub search: Option<String>,

  /// Print JSON instead of a table
  #[arg(long)]
  pub json: bool,
}

impl ListArgs {
  pub fn to_query(&self) -> RecordQuery {
    RecordQuery {
      sort_by: self.sort_by.clone(),
      descending: self.descending,
      search: self.search.clone(),
    }
  }
}

/// Build the service from configuration.
pub fn build_service(config: &Config) -> Result<BreweryService> {
  let fetcher = HttpFetcher::new(&config.source)?;
  let cache = MemoryCache::new().with_sliding_window(config.cache.sliding());
  let snapshot = FileSnapshotStore::new(config.snapshot.resolved_path()?);

  let service = RecordService::new(fetcher, cache, snapshot)
    .with_ttl(config.cache.ttl())
    .with_filter(config.source.filter.clone());

  Ok(service)
}

pub async fn list(service: &BreweryService, args: &ListArgs) -> Result<()> {
  if args.json {
    let records = service.get_records(&args.to_query()).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    return Ok(());
  }

  let result = service.query(&args.to_query()).await?;
  println!("{}", render(&result, false)?);
  Ok(())
}

/// Re-run a query on an interval, `count` times or forever.
pub async fn watch(
  service: &BreweryService,
  args: &ListArgs,
  interval_secs: u64,
  count: Option<u32>,
  refresh: bool,
) -> Result<()> {
  let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
  let mut round = 0u32;

  loop {
    ticker.tick().await;
    round += 1;

    if refresh {
      service.invalidate();
    }

    match service.query(&args.to_query()).await {
      Ok(result) => println!("{}", render(&result, args.json)?),
      // Keep watching; the source may come back
      Err(e) => error!(error = %e, round, "query failed"),
    }

    if count.is_some_and(|n| round >= n) {
      info!(round, "watch finished");
      return Ok(());
    }
  }
}

pub async fn snapshot(service: &BreweryService) -> Result<()> {
  let status = service.snapshot_status().await;
  println!("path:    {}", status.path.display());
  if status.has_data {
    println!("records: {}", status.record_count);
  } else {
    println!("records: none");
  }
  Ok(())
}

fn render(result: &QueryResult, json: bool) -> Result<String> {
  if json {
    return Ok(serde_json::to_string_pretty(&result.records)?);
  }
  Ok(render_table(&result.records, result.origin))
}

fn origin_label(origin: DataOrigin) -> &'static str {
  match origin {
    DataOrigin::Cache => "cache",
    DataOrigin::Remote => "remote",
    DataOrigin::Snapshot => "snapshot (offline)",
  }
}

/// Plain-text table with a one-line summary footer.
pub fn render_table(records: &[DisplayRecord], origin: DataOrigin) -> String {
  const HEADERS: [&str; 3] = ["NAME", "CITY", "PHONE"];

  let mut widths = HEADERS.map(|h| h.chars().count());
  for record in records {
    for (width, field) in widths.iter_mut().zip(fields(record)) {
      *width = (*width).max(field.chars().count());
    }
  }

  let mut lines = Vec::with_capacity(records.len() + 2);
  lines.push(format_row(HEADERS, widths));
  for record in records {
    lines.push(format_row(fields(record), widths));
  }
  lines.push(format!("{} record(s) from {}", records.len(), origin_label(origin)));
  lines.join("\n")
}

fn fields(record: &DisplayRecord) -> [&str; 3] {
  [&record.name, &record.city, &record.phone]
}

fn format_row(cells: [&str; 3], widths: [usize; 3]) -> String {
  let row = format!(
    "{:<w0$}  {:<w1$}  {}",
    cells[0],
    cells[1],
    cells[2],
    w0 = widths[0],
    w1 = widths[1]
  );
  row.trim_end().to_string()
}
