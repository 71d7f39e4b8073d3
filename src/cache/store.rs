//! Cache Store Module
//!
//! Namespaced key/value store with lazy TTL expiry and an optional LRU
//! capacity bound. Every operation is total: misses are reported through
//! `Option`, never through an error.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, LruTracker, SystemClock, KEY_DELIMITER};

/// Handle through which consumers share one store instance.
pub type SharedCache = Arc<RwLock<CacheStore>>;

// == Cache Store ==
/// In-memory store owning every key under one namespace.
#[derive(Debug)]
pub struct CacheStore {
    /// Prefix rendered into every generated key
    namespace: String,
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker, only consulted when `max_entries` is set
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Capacity bound, None = unbounded
    max_entries: Option<usize>,
    /// Time source for TTL checks
    clock: Arc<dyn Clock>,
    /// Bumped by every `delete` and `flush`
    generation: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an unbounded store for `namespace` on the system clock.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_clock(namespace, Arc::new(SystemClock))
    }

    /// Creates an unbounded store for `namespace` on the given clock.
    pub fn with_clock(namespace: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: None,
            clock,
            generation: 0,
        }
    }

    /// Bounds the store to `max_entries`; 0 leaves it unbounded.
    pub fn with_capacity(mut self, max_entries: usize) -> Self {
        self.max_entries = (max_entries > 0).then_some(max_entries);
        self
    }

    /// Wraps the store in a shareable handle.
    pub fn shared(self) -> SharedCache {
        Arc::new(RwLock::new(self))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Invalidation generation. A value read from elsewhere while the
    /// generation stayed the same cannot have been invalidated meanwhile.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // == Generate Key ==
    /// Renders `<namespace>:<id>`.
    pub fn generate_key(&self, id: &str) -> String {
        format!("{}{}{}", self.namespace, KEY_DELIMITER, id)
    }

    // == Get ==
    /// Returns a copy of the value under `key`.
    ///
    /// Absent keys, expired keys and values that do not decode as `T` are
    /// all misses. Expired entries are evicted on the spot.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();

        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired(now) {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        match serde_json::from_value::<T>(entry.value.clone()) {
            Ok(value) => {
                self.stats.record_hit();
                if self.max_entries.is_some() {
                    self.lru.touch(key);
                }
                Some(value)
            }
            Err(e) => {
                debug!("Cached value under '{}' has unexpected shape: {}", key, e);
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a copy of `value` under `key`, replacing any previous entry.
    ///
    /// With `ttl` (seconds) the entry expires on its own; without it the
    /// entry lives until deleted, flushed or evicted for capacity. A value
    /// that cannot be serialized is not stored and any previous entry for
    /// the key is dropped.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T, ttl: Option<u64>) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Refusing to cache unserializable value under '{}': {}", key, e);
                if self.entries.remove(key).is_some() {
                    self.lru.remove(key);
                }
                return;
            }
        };

        let is_overwrite = self.entries.contains_key(key);
        if let Some(max_entries) = self.max_entries {
            if !is_overwrite && self.entries.len() >= max_entries {
                self.cleanup_expired();
            }
            if !is_overwrite && self.entries.len() >= max_entries {
                if let Some(evicted_key) = self.lru.evict_oldest() {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                    debug!("Evicted '{}' to stay within {} entries", evicted_key, max_entries);
                }
            }
            self.lru.touch(key);
        }

        let entry = CacheEntry::new(value, ttl, self.clock.now_ms());
        self.entries.insert(key.to_string(), entry);
        self.stats.record_set();
        self.stats.set_total_entries(self.entries.len());
    }

    /// Stores `value` like `set`, but only if no `delete` or `flush` has run
    /// since `generation` was read. Returns whether the value was stored.
    pub fn set_if_generation<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
        ttl: Option<u64>,
        generation: u64,
    ) -> bool {
        if self.generation != generation {
            debug!("Skipping fill of '{}': invalidated while loading", key);
            return false;
        }
        self.set(key, value, ttl);
        true
    }

    // == Delete ==
    /// Removes every listed key that is present.
    ///
    /// One call is one invalidation event, however many keys it names.
    pub fn delete<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            let key = key.as_ref();
            if self.entries.remove(key).is_some() {
                self.lru.remove(key);
            }
        }
        self.generation += 1;
        self.stats.record_invalidation();
        self.stats.set_total_entries(self.entries.len());
    }

    // == Flush ==
    /// Drops every entry owned by this instance. Counters are kept.
    pub fn flush(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.generation += 1;
        self.stats.set_total_entries(0);
        debug!("Flushed {} entries from namespace '{}'", dropped, self.namespace);
    }

    // == Stats ==
    /// Returns a snapshot of this instance's counters and records the call.
    pub fn stats(&mut self) -> CacheStats {
        self.stats.record_stats_call();
        self.stats.set_total_entries(self.entries.len());
        self.stats.clone()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
