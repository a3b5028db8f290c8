//! Cache Store Module
//!
//! HashMap storage with TTL expiration. Expired entries are treated as
//! absent and removed lazily on access; a background sweep handles entries
//! that are never touched again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheKey, CacheStats, CachedValue};

// == Cache Store ==
/// In-memory key-value storage with TTL expiration.
///
/// Process-lifetime scoped and entirely volatile: created empty, mutated by
/// every memoized call, emptied on demand. The store is not internally
/// synchronized; [`TtlCache`](crate::TtlCache) guards it behind a lock.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<CacheKey, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty CacheStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Stores a value under `key` with the given TTL.
    ///
    /// If the key already exists, the value is overwritten and the TTL is
    /// reset, so at most one entry exists per key.
    ///
    /// # Arguments
    /// * `key` - The derived cache key
    /// * `value` - The memoized result
    /// * `ttl` - Lifetime of the entry
    pub fn insert(&mut self, key: CacheKey, value: CachedValue, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Lookup ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if present and unexpired; a hit is recorded. An
    /// expired entry is removed, counted as an expiration, and reported as
    /// absent. Miss accounting is done by the memoization layer, which knows
    /// whether an absent entry actually leads to an invocation.
    pub fn lookup(&mut self, key: &CacheKey) -> Option<CachedValue> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                debug!(key = %key, "cache entry expired");
                self.entries.remove(key);
                self.stats.record_expiration();
                self.stats.set_total_entries(self.entries.len());
                return None;
            }

            debug!(key = %key, "cache hit");
            let value = Arc::clone(&entry.value);
            self.stats.record_hit();
            return Some(value);
        }

        None
    }

    // == Record Miss ==
    /// Records that a call had to invoke the underlying operation.
    pub fn record_miss(&mut self) {
        self.stats.record_miss();
    }

    // == Record Bypass ==
    /// Records a call that skipped the cache entirely.
    pub fn record_bypass(&mut self) {
        self.stats.record_bypass();
    }

    // == Clear ==
    /// Removes every entry unconditionally, regardless of remaining TTL.
    ///
    /// Returns the number of entries removed. Hit/miss counters are
    /// preserved; only the stored data is reset.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.stats.set_total_entries(0);
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.stats.record_expiration();
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::KeyBuilder;
    use tokio::time::advance;

    fn key(name: &str) -> CacheKey {
        KeyBuilder::new(name).build()
    }

    fn value(s: &str) -> CachedValue {
        Arc::new(s.to_string())
    }

    fn as_string(v: &CachedValue) -> String {
        v.downcast_ref::<String>().cloned().unwrap()
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_insert_and_lookup() {
        let mut store = CacheStore::new();

        store.insert(key("op1"), value("value1"), Duration::from_secs(300));
        let found = store.lookup(&key("op1")).unwrap();

        assert_eq!(as_string(&found), "value1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_lookup_nonexistent() {
        let mut store = CacheStore::new();

        assert!(store.lookup(&key("nonexistent")).is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new();

        store.insert(key("op1"), value("value1"), Duration::from_secs(300));
        store.insert(key("op1"), value("value2"), Duration::from_secs(300));

        let found = store.lookup(&key("op1")).unwrap();
        assert_eq!(as_string(&found), "value2");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_expiration() {
        let mut store = CacheStore::new();

        store.insert(key("op1"), value("value1"), Duration::from_secs(1));

        // Accessible immediately
        assert!(store.lookup(&key("op1")).is_some());

        advance(Duration::from_millis(1100)).await;

        // Expired and removed on access
        assert!(store.lookup(&key("op1")).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_clear() {
        let mut store = CacheStore::new();

        store.insert(key("op1"), value("value1"), Duration::from_secs(300));
        store.insert(key("op2"), value("value2"), Duration::from_secs(300));

        let removed = store.clear();

        assert_eq!(removed, 2);
        assert!(store.is_empty());
        assert!(store.lookup(&key("op1")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_cleanup_expired() {
        let mut store = CacheStore::new();

        store.insert(key("op1"), value("value1"), Duration::from_secs(1));
        store.insert(key("op2"), value("value2"), Duration::from_secs(10));

        advance(Duration::from_millis(1100)).await;

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.lookup(&key("op2")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_stats() {
        let mut store = CacheStore::new();

        store.insert(key("op1"), value("value1"), Duration::from_secs(1));
        store.lookup(&key("op1")); // hit
        store.record_miss();

        advance(Duration::from_secs(2)).await;
        store.lookup(&key("op1")); // expired

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
    }
}
