//! Error types for the record pipeline.

/// Failure while reading the remote source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  /// Network, timeout, or non-success HTTP status.
  #[error("remote source unavailable at {url}: {message}")]
  RemoteUnavailable { url: String, message: String },

  /// The payload could not be parsed into records.
  #[error("malformed response from {url}: {source}")]
  MalformedResponse {
    url: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Failure while writing the snapshot. Never fatal to a read.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
  #[error("snapshot i/o error at {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to serialize snapshot: {0}")]
  Serialize(#[from] serde_json::Error),
}

/// Errors surfaced to callers of [`RecordService`](crate::service::RecordService).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  /// The fetch failed and no snapshot could stand in for it.
  #[error("no data source available")]
  NoDataSource {
    #[source]
    source: FetchError,
  },
}
