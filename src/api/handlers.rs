//! API Handlers
//!
//! HTTP request handlers for the catalog and cache endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::{
    CacheStore, Clock, SharedCache, SystemClock, PRODUCT_NAMESPACE, RATE_LIMIT_NAMESPACE,
};
use crate::catalog::{InMemoryProductRepository, Product, ProductCatalog, ProductPage};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    CreateProductRequest, DeleteResponse, FlushResponse, HealthResponse, ListQuery,
    NamespaceStats, StatsResponse, UpdateProductRequest,
};
use crate::ratelimit::RateLimiter;
use crate::readthrough::ReadThroughCache;

/// Catalog service as wired into the server.
pub type Catalog = ProductCatalog<InMemoryProductRepository>;

/// Application state shared across all handlers.
///
/// Each cache namespace is its own store; the catalog and the rate limiter
/// hold handles to theirs.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub product_cache: SharedCache,
    pub rate_limit_cache: SharedCache,
    pub limiter: RateLimiter,
    pub rate_limit_enabled: bool,
    pub trust_proxy: bool,
}

impl AppState {
    /// Builds both cache namespaces on `clock` and wires them to
    /// `repository` and the configured rate-limit policies.
    pub fn new(
        repository: Arc<InMemoryProductRepository>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let product_cache = CacheStore::with_clock(PRODUCT_NAMESPACE, clock.clone())
            .with_capacity(config.cache_max_entries)
            .shared();
        let rate_limit_cache = CacheStore::with_clock(RATE_LIMIT_NAMESPACE, clock.clone()).shared();

        let read_through =
            ReadThroughCache::new(product_cache.clone()).with_aggregate_ttl(config.aggregate_ttl);
        let limiter = RateLimiter::new(rate_limit_cache.clone(), config.rate_limits.clone(), clock);

        Self {
            catalog: Arc::new(ProductCatalog::new(repository, read_through)),
            product_cache,
            rate_limit_cache,
            limiter,
            rate_limit_enabled: config.rate_limit_enabled,
            trust_proxy: config.trust_proxy,
        }
    }

    /// Creates a new AppState from configuration with an empty repository
    /// and the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(InMemoryProductRepository::new()),
            config,
            Arc::new(SystemClock),
        )
    }

    /// Stores swept by the background expiry task.
    pub fn caches(&self) -> Vec<SharedCache> {
        vec![self.product_cache.clone(), self.rate_limit_cache.clone()]
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut caches = Vec::with_capacity(2);
    for cache in state.caches() {
        let mut cache = cache.write().await;
        let stats = cache.stats();
        caches.push(NamespaceStats::new(cache.namespace(), stats));
    }

    Json(StatsResponse { caches })
}

/// Handler for POST /cache/flush
///
/// Resets the product namespace; the next lookups repopulate it.
pub async fn flush_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    state.catalog.cache().flush().await;
    Json(FlushResponse::new(PRODUCT_NAMESPACE))
}

/// Handler for GET /products?page=N
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductPage>> {
    let page = state.catalog.list_products(query.page()).await?;
    Ok(Json(page))
}

/// Handler for GET /products/top-rated
pub async fn top_rated_handler(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog.top_rated().await?;
    Ok(Json(products))
}

/// Handler for GET /products/:id
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Product>> {
    state
        .catalog
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))
}

/// Handler for POST /products
pub async fn create_product_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let product = state.catalog.create_product(req.product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for PUT /products/:id
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    state
        .catalog
        .update_product(id, req.update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))
}

/// Handler for DELETE /products/:id
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    if state.catalog.delete_product(id).await? {
        Ok(Json(DeleteResponse::new(id)))
    } else {
        Err(ApiError::NotFound(format!("Product {} not found", id)))
    }
}
