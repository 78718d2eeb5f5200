//! Record service: cache, remote fetch, and snapshot fallback in one read.

use chrono::Duration;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::error::ServiceError;
use crate::search;
use crate::snapshot::SnapshotStore;
use crate::source::{DisplayRecord, Fetcher, SourceRecord};

/// Single cache key for the whole record set.
pub const CACHE_KEY: &str = "brewery_data";

/// What a caller asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
  pub sort_by: String,
  pub descending: bool,
  pub search: Option<String>,
}

impl Default for RecordQuery {
  fn default() -> Self {
    Self {
      sort_by: "city".to_string(),
      descending: false,
      search: None,
    }
  }
}

/// Where the working set for a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
  /// Live cache entry, no fetch attempted
  Cache,
  /// Fresh data from the remote source
  Remote,
  /// Remote failed, served from the local snapshot
  Snapshot,
}

/// Records plus the origin of the working set they were drawn from.
#[derive(Debug, Clone)]
pub struct QueryResult {
  pub records: Vec<DisplayRecord>,
  pub origin: DataOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStatus {
  pub path: PathBuf,
  pub has_data: bool,
  pub record_count: usize,
}

/// Read path over the remote source with caching and offline fallback.
///
/// 1. Serve a live, non-empty cache entry as-is
/// 2. Otherwise fetch; a non-empty result is cached and snapshotted
/// 3. If the fetch fails, fall back to the snapshot
/// 4. Search, then sort
///
/// Only the "fetch failed and no snapshot" case is an error.
pub struct RecordService<F, C, S> {
  fetcher: Arc<F>,
  cache: Arc<C>,
  snapshot: Arc<S>,
  ttl: Duration,
  filter: String,
}

impl<F, C, S> RecordService<F, C, S>
where
  F: Fetcher,
  C: CacheStore<Vec<SourceRecord>>,
  S: SnapshotStore,
{
  pub fn new(fetcher: F, cache: C, snapshot: S) -> Self {
    Self {
      fetcher: Arc::new(fetcher),
      cache: Arc::new(cache),
      snapshot: Arc::new(snapshot),
      ttl: Duration::minutes(10),
      filter: String::new(),
    }
  }

  /// Set how long a fetched record set stays cached.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Set the filter passed to the fetcher.
  pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
    self.filter = filter.into();
    self
  }

  /// Get records for a query, sorted and filtered.
  pub async fn get_records(&self, query: &RecordQuery) -> Result<Vec<DisplayRecord>, ServiceError> {
    Ok(self.query(query).await?.records)
  }

  /// Like [`get_records`](Self::get_records), but also report the origin.
  pub async fn query(&self, query: &RecordQuery) -> Result<QueryResult, ServiceError> {
    info!(
      sort_by = query.sort_by.as_str(),
      descending = query.descending,
      search = query.search.as_deref().unwrap_or(""),
      "getting records"
    );

    let (working_set, origin) = self.working_set().await?;

    let matched = search::search(&working_set, query.search.as_deref());
    let records = search::sort(matched, &query.sort_by, query.descending);

    info!(count = records.len(), ?origin, "returning records");
    Ok(QueryResult { records, origin })
  }

  /// Drop the cached record set so the next read goes to the source.
  pub fn invalidate(&self) {
    self.cache.remove(CACHE_KEY);
    debug!("record cache invalidated");
  }

  pub async fn snapshot_status(&self) -> SnapshotStatus {
    let path = self.snapshot.path().to_path_buf();
    if !self.snapshot.has_data().await {
      return SnapshotStatus {
        path,
        has_data: false,
        record_count: 0,
      };
    }
    let record_count = self.snapshot.load().await.len();
    SnapshotStatus {
      path,
      has_data: record_count > 0,
      record_count,
    }
  }

  async fn working_set(&self) -> Result<(Vec<SourceRecord>, DataOrigin), ServiceError> {
    if let Some(cached) = self.cache.get(CACHE_KEY) {
      if !cached.is_empty() {
        debug!(count = cached.len(), "using cached records");
        return Ok((cached, DataOrigin::Cache));
      }
    }

    debug!(filter = self.filter.as_str(), "cache miss, fetching from remote source");
    match self.fetcher.fetch(&self.filter).await {
      Ok(records) => {
        if !records.is_empty() {
          self.cache.set(CACHE_KEY, records.clone(), self.ttl);

          // Persisting is best-effort; the read already has its data
          if let Err(e) = self.snapshot.save(&records).await {
            warn!(error = %e, "failed to persist snapshot");
          }

          info!(count = records.len(), "fetched and cached records");
        }
        Ok((records, DataOrigin::Remote))
      }
      Err(fetch_err) => {
        warn!(error = %fetch_err, "remote fetch failed, trying snapshot");

        let fallback = self.snapshot.load().await;
        if fallback.is_empty() {
          error!("remote fetch failed and no snapshot data is available");
          return Err(ServiceError::NoDataSource { source: fetch_err });
        }

        info!(count = fallback.len(), "using snapshot records");
        Ok((fallback, DataOrigin::Snapshot))
      }
    }
  }
}

impl<F, C, S> Clone for RecordService<F, C, S> {
  fn clone(&self) -> Self {
    Self {
      fetcher: Arc::clone(&self.fetcher),
      cache: Arc::clone(&self.cache),
      snapshot: Arc::clone(&self.snapshot),
      ttl: self.ttl,
      filter: self.filter.clone(),
    }
  }
}
