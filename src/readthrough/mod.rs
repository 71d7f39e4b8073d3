//! Read-Through Cache
//!
//! Puts a CacheStore in front of a slower source of truth. Lookups consult
//! the cache first and fill it on a miss; writers populate or invalidate
//! after the source has been updated.
//!
//! Single-record keys carry no TTL and are only dropped by invalidation.
//! Aggregate keys (listings, rankings) embed many records and are not
//! invalidated per record, so they are stored with a bounded TTL instead.

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cache::{CacheStats, SharedCache};

/// Default staleness ceiling for aggregate keys, in seconds.
pub const DEFAULT_AGGREGATE_TTL: u64 = 60;

// == Read-Through Cache ==
#[derive(Debug, Clone)]
pub struct ReadThroughCache {
    cache: SharedCache,
    aggregate_ttl: u64,
}

impl ReadThroughCache {
    pub fn new(cache: SharedCache) -> Self {
        Self {
            cache,
            aggregate_ttl: DEFAULT_AGGREGATE_TTL,
        }
    }

    /// Sets the TTL (seconds) applied to aggregate keys.
    pub fn with_aggregate_ttl(mut self, secs: u64) -> Self {
        self.aggregate_ttl = secs;
        self
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Looks up a single record by `id`.
    ///
    /// On a hit `load` is never called. On a miss `load` runs; a found
    /// record is cached without TTL, an absent one is not cached, and an
    /// error is returned untouched. A record loaded while an invalidation
    /// ran is returned but not cached.
    pub async fn fetch<T, E, F, Fut>(&self, id: &str, load: F) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        self.fetch_with_ttl(id, None, load).await
    }

    /// Looks up an aggregate (e.g. `all-<page>`, `top-rated`). Same as
    /// `fetch`, but the filled entry expires after the aggregate TTL.
    pub async fn fetch_aggregate<T, E, F, Fut>(&self, id: &str, load: F) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        self.fetch_with_ttl(id, Some(self.aggregate_ttl), load).await
    }

    async fn fetch_with_ttl<T, E, F, Fut>(
        &self,
        id: &str,
        ttl: Option<u64>,
        load: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let (key, generation) = {
            let mut cache = self.cache.write().await;
            let key = cache.generate_key(id);
            if let Some(hit) = cache.get::<T>(&key) {
                return Ok(Some(hit));
            }
            (key, cache.generation())
        };

        // the lock is not held while the source of truth is queried; a
        // write invalidating meanwhile makes the loaded value unfit to cache
        let loaded = load().await?;

        if let Some(value) = &loaded {
            let mut cache = self.cache.write().await;
            if cache.set_if_generation(&key, value, ttl, generation) {
                debug!("Filled '{}' from source of truth", key);
            }
        }

        Ok(loaded)
    }

    /// Caches a freshly written record under `id` ahead of any lookup.
    pub async fn populate<T: Serialize + ?Sized>(&self, id: &str, value: &T) {
        let mut cache = self.cache.write().await;
        let key = cache.generate_key(id);
        cache.set(&key, value, None);
    }

    /// Drops the entries for `ids` as one invalidation event and returns
    /// the resulting stats snapshot.
    pub async fn invalidate<S: AsRef<str>>(&self, ids: &[S]) -> CacheStats {
        let mut cache = self.cache.write().await;
        let keys: Vec<String> = ids.iter().map(|id| cache.generate_key(id.as_ref())).collect();
        cache.delete(&keys);
        debug!("Invalidated {:?}", keys);
        cache.stats()
    }

    /// Drops every entry in the namespace.
    pub async fn flush(&self) {
        self.cache.write().await.flush();
    }
}
