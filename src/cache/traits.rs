//! Core trait for the in-memory cache.

use chrono::Duration;

/// Key/value store with per-write expiry.
///
/// A missing key and an expired key are indistinguishable to callers.
pub trait CacheStore<T>: Send + Sync {
  /// Get a live value, renewing its idle window if the store has one.
  fn get(&self, key: &str) -> Option<T>;

  /// Store a value that expires `ttl` from now, replacing any previous one.
  fn set(&self, key: &str, value: T, ttl: Duration);

  /// Drop a value if present.
  fn remove(&self, key: &str);

  /// Whether a live value exists. Counts as an access for the idle window.
  #[allow(dead_code)]
  fn exists(&self, key: &str) -> bool;
}
