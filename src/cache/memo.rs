//! Memoization Module
//!
//! Wraps expensive, rate-limited data-fetch operations behind a shared TTL
//! cache. Provides the transparent wrapping contract, the operational
//! `clear` reset, and per-key in-flight deduplication so concurrent misses
//! do not stampede the upstream.

use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheArgs, CacheKey, CacheStats, CacheStore, KeyBuilder};

// == TTL Cache ==
/// Shared handle to the memoization cache.
///
/// Cloning is cheap and clones share the same store, so a single cache can
/// back many wrapped operations. The cache is constructed explicitly and
/// injected wherever operations are composed; tests create isolated
/// instances instead of sharing hidden global state.
#[derive(Debug, Clone, Default)]
pub struct TtlCache {
    /// Shared entry storage, guarded for concurrent callers
    store: Arc<RwLock<CacheStore>>,
    /// Per-key in-flight computation guards. Guarded by a std mutex (never
    /// held across an await) so the release path can run synchronously on
    /// drop.
    flights: Arc<StdMutex<HashMap<CacheKey, Arc<Mutex<()>>>>>,
}

impl TtlCache {
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // == Wrap ==
    /// Wraps an operation so its results are memoized for `ttl`.
    ///
    /// The TTL is fixed at wrap time and applies to every call. The returned
    /// [`Memoized`] shares this cache's store, so `clear` affects all wrapped
    /// operations at once.
    ///
    /// # Arguments
    /// * `name` - Stable identifier of the operation, part of every key
    /// * `ttl` - Duration after which a cached result is discarded and recomputed
    /// * `operation` - The fallible async operation to memoize
    pub fn wrap<A, T, E, F, Fut>(
        &self,
        name: impl Into<String>,
        ttl: Duration,
        operation: F,
    ) -> Memoized<A, T, F>
    where
        A: CacheArgs,
        T: Clone + Send + Sync + 'static,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        Memoized {
            cache: self.clone(),
            name: name.into(),
            ttl,
            operation,
            _marker: PhantomData,
        }
    }

    // == Get Or Compute ==
    /// Serves `key` from the cache or computes and stores it.
    ///
    /// At most one computation runs per key at a time: the first caller to
    /// miss invokes `compute` while concurrent missers wait on the key's
    /// flight guard and re-check the store once it is released. A successful
    /// result is stored with `expires_at = now + ttl`; an `Err` is propagated
    /// to the caller unchanged and never written to the store, so the next
    /// call retries immediately.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // Fast path: valid entry, no flight guard needed.
        if let Some(value) = self.lookup_typed::<T>(&key).await {
            return Ok(value);
        }

        let flight = self.flight_guard(&key);
        let _release = FlightRelease {
            flights: &*self.flights,
            key: &key,
            guard: &flight,
        };
        let _in_flight = flight.lock().await;

        // A concurrent caller may have stored the value while we waited.
        if let Some(value) = self.lookup_typed::<T>(&key).await {
            return Ok(value);
        }

        debug!(key = %key, "cache miss, invoking operation");
        self.store.write().await.record_miss();

        let result = compute().await;

        if let Ok(value) = &result {
            self.store
                .write()
                .await
                .insert(key.clone(), Arc::new(value.clone()), ttl);
        }

        result
    }

    // == Clear ==
    /// Empties the entire store unconditionally, regardless of remaining TTL.
    ///
    /// In-flight computations that already missed still complete and write a
    /// fresh entry back; `clear` is a manual operational reset, not a
    /// transactional barrier.
    pub async fn clear(&self) {
        let removed = self.store.write().await.clear();
        info!(removed, "cache cleared");
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    // == Internals ==
    /// Looks up a valid entry and downcasts it to the caller's type.
    ///
    /// The operation identity is part of every key, so a downcast mismatch
    /// only occurs when two operations share a name with different result
    /// types; it is treated as a miss and the entry is overwritten.
    async fn lookup_typed<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let value = self.store.write().await.lookup(key)?;
        value.downcast_ref::<T>().cloned()
    }

    /// Returns the in-flight guard for `key`, creating it on first miss.
    fn flight_guard(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(flights.entry(key.clone()).or_default())
    }

    pub(crate) async fn record_bypass(&self) {
        self.store.write().await.record_bypass();
    }
}

// == Flight Release ==
/// Removes a key's flight guard from the map once its holder is done.
///
/// Runs on drop, so the map is cleaned up even when a caller's future is
/// dropped mid-compute. A dropped waiter only releases its clone of the
/// guard; it never cancels a computation other callers are awaiting.
struct FlightRelease<'a> {
    flights: &'a StdMutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
    key: &'a CacheKey,
    guard: &'a Arc<Mutex<()>>,
}

impl Drop for FlightRelease<'_> {
    fn drop(&mut self) {
        let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = flights.get(self.key) {
            // Two strong refs mean the map and this caller; nobody else waits.
            if Arc::ptr_eq(current, self.guard) && Arc::strong_count(self.guard) <= 2 {
                flights.remove(self.key);
            }
        }
    }
}

// == Memoized Operation ==
/// An operation wrapped by [`TtlCache::wrap`].
///
/// Calling it is indistinguishable from calling the operation directly,
/// except that cache hits skip the invocation (and its side effects) and a
/// hit may return a value up to the configured TTL old.
pub struct Memoized<A, T, F> {
    cache: TtlCache,
    name: String,
    ttl: Duration,
    operation: F,
    _marker: PhantomData<fn(A) -> T>,
}

impl<A, T, F> Memoized<A, T, F> {
    /// The operation identifier used in key derivation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The TTL applied to every call, fixed at wrap time.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Call ==
    /// Invokes the wrapped operation through the cache.
    ///
    /// A valid cached entry is returned without invoking the operation. On a
    /// miss the operation runs and its `Ok` result is stored for the
    /// configured TTL; failures propagate unchanged and are never cached.
    ///
    /// When the arguments cannot be canonicalized into a key, the call
    /// bypasses the cache entirely and the operation runs as-is: caching is
    /// an optimization, never a correctness dependency.
    pub async fn call<E, Fut>(&self, args: A) -> Result<T, E>
    where
        A: CacheArgs,
        T: Clone + Send + Sync + 'static,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = match args.write_key(KeyBuilder::new(&self.name)) {
            Ok(builder) => builder.build(),
            Err(err) => {
                warn!(
                    operation = %self.name,
                    error = %err,
                    "key derivation failed, bypassing cache"
                );
                self.cache.record_bypass().await;
                return (self.operation)(args).await;
            }
        };

        self.cache
            .get_or_compute(key, self.ttl, || (self.operation)(args))
            .await
    }
}
