//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! Expiry-on-read keeps the cache correct on its own; the sweep exists so
//! entries that are never touched again do not accumulate in a long-running
//! process.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;

/// Spawns a background task that periodically removes expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps.
///
/// # Arguments
/// * `cache` - Handle to the cache to sweep
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = TtlCache::new();
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: TtlCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
