//! Durable snapshot of the last good record set.
//!
//! The snapshot is the fallback when the remote source is down. Reads never
//! fail: a missing, empty, or unreadable file is simply "no snapshot".

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::error::PersistenceError;
use crate::source::api_types::{parse_records, SourceRecord};

/// Whole-collection persistence used as the last-resort fallback.
pub trait SnapshotStore: Send + Sync {
  /// Read the snapshot; empty when absent or unreadable.
  fn load(&self) -> impl Future<Output = Vec<SourceRecord>> + Send;

  /// Replace the snapshot. An empty slice leaves the previous one in place.
  fn save(
    &self,
    records: &[SourceRecord],
  ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

  /// Whether a non-empty snapshot exists.
  fn has_data(&self) -> impl Future<Output = bool> + Send;

  /// Where the snapshot lives.
  fn path(&self) -> &Path;
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSON file snapshot, replaced by write-to-temp-then-rename.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
  path: PathBuf,
}

impl FileSnapshotStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Sibling temp file, unique per process and write.
  fn temp_path(&self) -> PathBuf {
    let file_name = self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "snapshot".to_string());
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(".{}.{}.{}.tmp", file_name, std::process::id(), seq);
    self.path.with_file_name(temp_name)
  }

  fn io_error(&self, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
      path: self.path.display().to_string(),
      source,
    }
  }

  async fn write_atomic(&self, data: &[u8]) -> Result<(), PersistenceError> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        tokio::fs::create_dir_all(parent)
          .await
          .map_err(|e| self.io_error(e))?;
      }
    }

    let temp = self.temp_path();
    let written: std::io::Result<()> = async {
      let mut file = tokio::fs::File::create(&temp).await?;
      file.write_all(data).await?;
      file.sync_all().await?;
      drop(file);
      tokio::fs::rename(&temp, &self.path).await
    }
    .await;

    if let Err(e) = written {
      let _ = tokio::fs::remove_file(&temp).await;
      return Err(self.io_error(e));
    }
    Ok(())
  }
}

impl SnapshotStore for FileSnapshotStore {
  async fn load(&self) -> Vec<SourceRecord> {
    if !self.has_data().await {
      warn!(path = %self.path.display(), "no snapshot data available");
      return Vec::new();
    }

    let contents = match tokio::fs::read_to_string(&self.path).await {
      Ok(contents) => contents,
      Err(e) => {
        error!(path = %self.path.display(), error = %e, "failed to read snapshot");
        return Vec::new();
      }
    };

    match parse_records(&contents) {
      Ok(records) => {
        info!(path = %self.path.display(), count = records.len(), "loaded snapshot");
        records
      }
      Err(e) => {
        error!(path = %self.path.display(), error = %e, "snapshot is not valid JSON records");
        Vec::new()
      }
    }
  }

  async fn save(&self, records: &[SourceRecord]) -> Result<(), PersistenceError> {
    if records.is_empty() {
      warn!(path = %self.path.display(), "refusing to overwrite snapshot with an empty record set");
      return Ok(());
    }

    let data = serde_json::to_vec_pretty(records)?;
    self.write_atomic(&data).await?;

    info!(path = %self.path.display(), count = records.len(), "saved snapshot");
    Ok(())
  }

  async fn has_data(&self) -> bool {
    match tokio::fs::metadata(&self.path).await {
      Ok(meta) => {
        if meta.len() == 0 {
          debug!(path = %self.path.display(), "snapshot file exists but is empty");
        }
        meta.is_file() && meta.len() > 0
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
      Err(e) => {
        error!(path = %self.path.display(), error = %e, "failed to check snapshot");
        false
      }
    }
  }

  fn path(&self) -> &Path {
    &self.path
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  fn sample() -> Vec<SourceRecord> {
    vec![
      SourceRecord::new("Alpha", "Denver", "111"),
      SourceRecord::new("Beta", "Austin", "222"),
    ]
  }

  #[tokio::test]
  async fn test_load_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

    assert!(!store.has_data().await);
    assert!(store.load().await.is_empty());
  }

  #[test]
  fn test_path_is_configured_location() {
    let store = FileSnapshotStore::new("/var/lib/brewcache/snapshot.json");
    assert_eq!(store.path(), Path::new("/var/lib/brewcache/snapshot.json"));
  }

  #[tokio::test]
  async fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

    let mut records = sample();
    records[0]
      .extra
      .insert("postal_code".to_string(), serde_json::json!("80202"));
    store.save(&records).await.unwrap();

    assert!(store.has_data().await);
    assert_eq!(store.load().await, records);
  }

  #[tokio::test]
  async fn test_save_empty_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

    store.save(&sample()).await.unwrap();
    store.save(&[]).await.unwrap();

    assert_eq!(store.load().await, sample());
  }

  #[tokio::test]
  async fn test_save_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

    store.save(&sample()).await.unwrap();
    let replacement = vec![SourceRecord::new("Gamma", "Reno", "333")];
    store.save(&replacement).await.unwrap();

    assert_eq!(store.load().await, replacement);
  }

  #[tokio::test]
  async fn test_corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = FileSnapshotStore::new(&path);

    assert!(store.has_data().await);
    assert!(store.load().await.is_empty());
  }

  #[tokio::test]
  async fn test_zero_length_file_has_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, "").unwrap();
    let store = FileSnapshotStore::new(&path);

    assert!(!store.has_data().await);
    assert!(store.load().await.is_empty());
  }

  #[tokio::test]
  async fn test_save_creates_parent_dirs_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = FileSnapshotStore::new(nested.join("snapshot.json"));

    store.save(&sample()).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(&nested)
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["snapshot.json".to_string()]);
  }

  #[tokio::test]
  async fn test_save_into_unwritable_location_errors() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the parent directory should be
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let store = FileSnapshotStore::new(blocker.join("snapshot.json"));

    let err = store.save(&sample()).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Io { .. }), "got: {err:?}");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_concurrent_readers_never_see_partial_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileSnapshotStore::new(dir.path().join("snapshot.json")));

    let small = sample();
    let large: Vec<SourceRecord> = (0..200)
      .map(|i| SourceRecord::new(&format!("Brewery {i}"), "Portland", &format!("{i:03}")))
      .collect();
    store.save(&small).await.unwrap();

    let mut writers = Vec::new();
    let mut readers = Vec::new();
    for i in 0..20 {
      let store_w = Arc::clone(&store);
      let records = if i % 2 == 0 { large.clone() } else { small.clone() };
      writers.push(tokio::spawn(async move { store_w.save(&records).await }));

      let store_r = Arc::clone(&store);
      readers.push(tokio::spawn(async move { store_r.load().await.len() }));
    }

    for handle in writers {
      handle.await.unwrap().unwrap();
    }
    for handle in readers {
      let len = handle.await.unwrap();
      assert!(len == small.len() || len == large.len(), "partial read: {len}");
    }
    let final_len = store.load().await.len();
    assert!(final_len == small.len() || final_len == large.len());
  }
}
