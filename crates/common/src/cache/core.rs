//! Core TTL cache implementation.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Generic thread-safe cache where every entry has its own time-to-live.
///
/// # Type Parameters
/// - `K`: key type
/// - `V`: value type, cloned out on every hit
/// - `C`: clock used for deadlines (defaults to [`SystemClock`])
///
/// Concurrent writes to the same key are last-write-wins.
pub struct TtlCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Create an empty cache with a custom clock (useful for testing).
    pub fn with_clock(clock: C) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), metrics: MetricsCollector::new(), clock }
    }

    /// Store `value` under `key` for `ttl`.
    ///
    /// A zero `ttl` stores nothing and drops any existing entry for the key.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        if ttl.is_zero() {
            if self.entries.write().remove(&key).is_some() {
                self.metrics.record_invalidation();
            }
            return;
        }

        let expires_at = self.clock.now() + ttl;
        self.entries.write().insert(key, CacheEntry { value, expires_at });
        self.metrics.record_insert();
    }

    /// Fetch a live value, dropping it if its deadline has passed.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => {
                    self.metrics.record_miss();
                    return None;
                }
                Some(entry) if now < entry.expires_at => {
                    self.metrics.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock: another writer may have refreshed it.
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                self.metrics.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                self.metrics.record_expiration();
                self.metrics.record_miss();
                None
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Remove a single entry, returning it whether or not it had expired.
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = self.entries.write().remove(key).map(|entry| entry.value);
        if removed.is_some() {
            self.metrics.record_invalidation();
        }
        removed
    }

    /// Remove every entry whose key matches `predicate`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        let removed = before - entries.len();
        for _ in 0..removed {
            self.metrics.record_invalidation();
        }
        removed
    }

    /// Drop all entries.
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.entries.write();
            let count = entries.len();
            entries.clear();
            count
        };
        tracing::debug!(removed, "cache cleared");
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len())
    }
}

impl<V, C> TtlCache<String, V, C>
where
    V: Clone,
    C: Clock,
{
    /// Remove every entry whose key starts with `prefix`.
    pub fn remove_prefix(&self, prefix: &str) -> usize {
        self.remove_where(|key| key.starts_with(prefix))
    }
}

impl<K, V, C> Clone for TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}
