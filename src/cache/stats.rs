//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, expirations and
//! bypasses.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
///
/// A hit is a call served from the store without invoking the wrapped
/// operation; a miss is a call that had to invoke it. Bypassed calls (key
/// derivation failure) are counted separately and contribute to neither.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of calls served from the cache
    pub hits: u64,
    /// Number of calls that invoked the underlying operation
    pub misses: u64,
    /// Number of entries discarded because their TTL elapsed
    pub expirations: u64,
    /// Number of calls that skipped the cache after a key derivation failure
    pub bypasses: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Bypass ==
    /// Increments the bypass counter.
    pub fn record_bypass(&mut self) {
        self.bypasses += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
