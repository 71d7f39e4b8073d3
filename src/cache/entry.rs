//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde_json::Value;

// == Cache Entry ==
/// A single stored value with its timing metadata.
///
/// Entries never leave the store by reference; `get` hands out a
/// deserialized copy of `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value, opaque to the store
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds; `None` keeps the entry until
    ///   it is deleted or flushed
    /// * `now_ms` - Current time in Unix milliseconds
    pub fn new(value: Value, ttl_seconds: Option<u64>, now_ms: u64) -> Self {
        let expires_at = ttl_seconds.map(|ttl| now_ms.saturating_add(ttl.saturating_mul(1000)));

        Self {
            value,
            created_at: now_ms,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once the current time reaches its expiration
    /// time, so a 1 second TTL is gone exactly 1000ms after it was set.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }
}
