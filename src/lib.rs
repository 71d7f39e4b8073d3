//! Storefront Cache - the shared caching layer of a store backend
//!
//! Provides a namespaced TTL key/value store, a fixed-window rate limiter
//! built on it, and read-through caching for catalog lookups.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod readthrough;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStats, CacheStore, SharedCache};
pub use config::Config;
pub use ratelimit::RateLimiter;
pub use readthrough::ReadThroughCache;
pub use tasks::spawn_cleanup_task;
