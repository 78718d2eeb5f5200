//! In-memory cache implementation.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::traits::CacheStore;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
  value: T,
  /// Hard cutoff: `written_at + ttl`
  expires_at: DateTime<Utc>,
  /// Last write or read, for the sliding window
  last_access: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
  fn is_expired(&self, now: DateTime<Utc>, sliding: Option<Duration>) -> bool {
    if now >= self.expires_at {
      return true;
    }
    match sliding {
      Some(window) => now - self.last_access >= window,
      None => false,
    }
  }
}

/// Mutex-guarded map of cache entries.
///
/// Values are replaced whole under the lock, so a reader never sees a
/// half-written entry.
pub struct MemoryCache<T> {
  entries: Mutex<HashMap<String, CacheEntry<T>>>,
  /// Idle window; `None` means only the absolute TTL applies
  sliding: Option<Duration>,
}

impl<T: Clone> MemoryCache<T> {
  /// Create a cache that only honours the absolute TTL.
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      sliding: None,
    }
  }

  /// Also expire entries that go unread for `window`.
  pub fn with_sliding_window(mut self, window: Option<Duration>) -> Self {
    self.sliding = window;
    self
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
    // Entries are swapped whole, so a poisoned map is still consistent
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Read a live entry and renew its idle window; expired entries are dropped.
  fn touch_at<R>(&self, key: &str, now: DateTime<Utc>, read: impl FnOnce(&T) -> R) -> Option<R> {
    let mut entries = self.lock();
    let Some(entry) = entries.get_mut(key) else {
      debug!(key, "cache miss");
      return None;
    };

    if entry.is_expired(now, self.sliding) {
      entries.remove(key);
      debug!(key, "cache entry expired");
      return None;
    }

    entry.last_access = now;
    Some(read(&entry.value))
  }

  fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
    if key.trim().is_empty() {
      warn!("attempted to get cache value with a blank key");
      return None;
    }

    let value = self.touch_at(key, now, T::clone)?;
    debug!(key, "cache hit");
    Some(value)
  }

  fn set_at(&self, key: &str, value: T, ttl: Duration, now: DateTime<Utc>) {
    if key.trim().is_empty() {
      warn!("attempted to set cache value with a blank key");
      return;
    }

    // Saturate instead of panicking on an out-of-range TTL
    let expires_at = now
      .checked_add_signed(ttl)
      .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let entry = CacheEntry {
      value,
      expires_at,
      last_access: now,
    };
    self.lock().insert(key.to_string(), entry);
    debug!(key, ttl_secs = ttl.num_seconds(), "cached value");
  }

  #[allow(dead_code)]
  fn exists_at(&self, key: &str, now: DateTime<Utc>) -> bool {
    if key.trim().is_empty() {
      warn!("attempted to check cache existence with a blank key");
      return false;
    }

    self.touch_at(key, now, |_| ()).is_some()
  }
}

impl<T: Clone> Default for MemoryCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone + Send> CacheStore<T> for MemoryCache<T> {
  fn get(&self, key: &str) -> Option<T> {
    self.get_at(key, Utc::now())
  }

  fn set(&self, key: &str, value: T, ttl: Duration) {
    self.set_at(key, value, ttl, Utc::now());
  }

  fn remove(&self, key: &str) {
    if key.trim().is_empty() {
      warn!("attempted to remove cache value with a blank key");
      return;
    }
    self.lock().remove(key);
    debug!(key, "removed cache entry");
  }

  fn exists(&self, key: &str) -> bool {
    self.exists_at(key, Utc::now())
  }
}
