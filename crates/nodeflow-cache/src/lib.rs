//! Expiring key-value store shared across runs.
//!
//! A [`TtlCache`] lives for the lifetime of the host process and is handed to
//! the cache node behaviors behind an `Arc`. Concurrent runs may read and
//! write the same keys; the last write wins. Expired entries are dropped
//! lazily on read, or in bulk via [`TtlCache::purge_expired`].

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

/// Default time-to-live used by cache writers that do not specify one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct Entry {
  value: Value,
  /// `None` when the TTL is too long to represent; such entries never expire.
  expires_at: Option<Instant>,
}

impl Entry {
  fn is_expired(&self, now: Instant) -> bool {
    self.expires_at.is_some_and(|at| now >= at)
  }
}

/// Concurrency-safe map whose entries expire after a per-entry TTL.
#[derive(Debug, Default)]
pub struct TtlCache {
  entries: RwLock<HashMap<String, Entry>>,
}

impl TtlCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store `value` under `key` for `ttl`. A zero TTL expires immediately;
  /// a TTL past the clock's range never expires.
  pub fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
    let key = key.into();
    let expires_at = Instant::now().checked_add(ttl);
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.insert(key, Entry { value, expires_at });
  }

  /// Get a live value. An expired entry is removed and reported missing.
  pub fn get(&self, key: &str) -> Option<Value> {
    let now = Instant::now();
    {
      let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
      match entries.get(key) {
        None => return None,
        Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
        Some(_) => {}
      }
    }

    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    // Another writer may have refreshed the key between the two locks.
    if let Some(entry) = entries.get(key) {
      if !entry.is_expired(now) {
        return Some(entry.value.clone());
      }
      entries.remove(key);
      debug!(key = %key, "cache_entry_expired");
    }
    None
  }

  /// Remove `key`, returning its value if it was still live.
  pub fn remove(&self, key: &str) -> Option<Value> {
    let now = Instant::now();
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries
      .remove(key)
      .filter(|entry| !entry.is_expired(now))
      .map(|entry| entry.value)
  }

  /// Drop every expired entry, returning how many were removed.
  pub fn purge_expired(&self) -> usize {
    let now = Instant::now();
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    let purged = before - entries.len();
    if purged > 0 {
      debug!(purged, "cache_purged");
    }
    purged
  }

  /// Number of stored entries, including expired ones not yet purged.
  pub fn len(&self) -> usize {
    self
      .entries
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn clear(&self) {
    self
      .entries
      .write()
      .unwrap_or_else(|e| e.into_inner())
      .clear();
  }
}
