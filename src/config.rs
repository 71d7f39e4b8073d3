//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::ratelimit::RateLimitPolicies;

/// Server configuration parameters.
///
/// Scalar values can be set through environment variables. The rate-limit
/// policy table is fixed at startup and not read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Capacity of the product cache, 0 = unbounded
    pub cache_max_entries: usize,
    /// TTL in seconds for listing and ranking cache entries
    pub aggregate_ttl: u64,
    /// Whether the rate-limit middleware is active
    pub rate_limit_enabled: bool,
    /// Whether `x-forwarded-for` / `x-real-ip` identify the client
    pub trust_proxy: bool,
    /// Named rate-limit policies
    pub rate_limits: RateLimitPolicies,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 30)
    /// - `CACHE_MAX_ENTRIES` - Product cache capacity (default: 10000)
    /// - `AGGREGATE_TTL` - Listing/ranking TTL in seconds (default: 60)
    /// - `RATE_LIMIT_ENABLED` - `true`/`false` (default: true)
    /// - `TRUST_PROXY` - `true`/`false` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            aggregate_ttl: env_or("AGGREGATE_TTL", defaults.aggregate_ttl),
            rate_limit_enabled: env_or("RATE_LIMIT_ENABLED", defaults.rate_limit_enabled),
            trust_proxy: env_or("TRUST_PROXY", defaults.trust_proxy),
            rate_limits: defaults.rate_limits,
        }
    }
}

/// Parses `name` from the environment, falling back to `default` when the
/// variable is unset or does not parse.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 30,
            cache_max_entries: 10_000,
            aggregate_ttl: 60,
            rate_limit_enabled: true,
            trust_proxy: false,
            rate_limits: RateLimitPolicies::default(),
        }
    }
}
