//! Cache Module
//!
//! Provides TTL memoization: deterministic key derivation, the in-memory
//! entry store, and the wrapping layer with stampede protection.

mod entry;
mod key;
mod memo;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CachedValue};
pub use key::{CacheArgs, CacheKey, KeyBuilder};
pub use memo::{Memoized, TtlCache};
pub use stats::CacheStats;
pub use store::CacheStore;
