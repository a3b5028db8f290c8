//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

// == Cached Value ==
/// Type-erased memoized payload.
///
/// Results are stored behind `Arc<dyn Any>` so operations with heterogeneous
/// return types can share a single store; the memoization layer downcasts
/// back to the concrete type on a hit.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
///
/// Timestamps come from the tokio clock so tests can pause and advance time
/// instead of sleeping.
#[derive(Clone)]
pub struct CacheEntry {
    /// The memoized result
    pub value: CachedValue,
    /// Creation instant
    pub created_at: Instant,
    /// Instant after which the entry is stale
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Duration after which the entry is considered stale
    pub fn new(value: CachedValue, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its expiration instant, so a TTL that has
    /// fully elapsed immediately invalidates the entry.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or zero if the entry has expired.
    ///
    /// Useful for debugging and statistics purposes.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// value is type-erased, so Debug only shows timing metadata
impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
