//! TTL Memo - An in-memory TTL memoization cache
//!
//! Shields rate-limited upstream data providers from repeated identical
//! requests: results of wrapped fetch operations are served from memory
//! until a fixed time-to-live elapses, after which the next call recomputes
//! and re-stores. Failures are never memoized, concurrent misses on the
//! same key are deduplicated, and an operational `clear` forces immediate
//! re-fetch of everything.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheArgs, CacheKey, CacheStats, KeyBuilder, Memoized, TtlCache};
pub use config::CacheConfig;
pub use error::KeyError;
pub use tasks::spawn_cleanup_task;
