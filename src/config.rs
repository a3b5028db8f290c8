//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment
//! variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default TTL in seconds for wrapped operations
    pub default_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Default TTL as a [`Duration`], ready to hand to
    /// [`TtlCache::wrap`](crate::TtlCache::wrap).
    pub fn default_ttl_duration(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            cleanup_interval: 60,
        }
    }
}
