//! Cache Module
//!
//! Namespaced in-memory caching with lazy TTL expiration and optional LRU
//! capacity bounds.

mod clock;
mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheStore, SharedCache};

// == Public Constants ==
/// Separator between namespace and id in generated keys
pub const KEY_DELIMITER: char = ':';

/// Namespace used for catalog records
pub const PRODUCT_NAMESPACE: &str = "product";

/// Namespace used for rate-limit windows
pub const RATE_LIMIT_NAMESPACE: &str = "rate-limit";
