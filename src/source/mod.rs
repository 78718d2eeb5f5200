//! Remote record source.

pub mod api_types;
pub mod client;
pub mod types;

use std::future::Future;

use crate::error::FetchError;

pub use api_types::SourceRecord;
pub use client::HttpFetcher;
pub use types::DisplayRecord;

/// Reads the record collection from wherever it lives.
///
/// `filter` is appended to the source's base address; an empty filter reads
/// the whole collection. An empty `Ok` means the source has no records.
pub trait Fetcher: Send + Sync {
  fn fetch(
    &self,
    filter: &str,
  ) -> impl Future<Output = Result<Vec<SourceRecord>, FetchError>> + Send;
}
