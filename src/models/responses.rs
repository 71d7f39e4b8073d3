//! Response DTOs for the HTTP surface
//!
//! Defines the structure of outgoing response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Stats of one cache namespace
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceStats {
    pub namespace: String,
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl NamespaceStats {
    pub fn new(namespace: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            namespace: namespace.into(),
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub caches: Vec<NamespaceStats>,
}

/// Response body for POST /cache/flush
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub message: String,
    pub namespace: String,
}

impl FlushResponse {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            message: format!("Namespace '{}' flushed", namespace),
            namespace,
        }
    }
}

/// Response body for DELETE /products/:id
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: u64,
}

impl DeleteResponse {
    pub fn new(id: u64) -> Self {
        Self {
            message: format!("Product {} deleted", id),
            id,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
