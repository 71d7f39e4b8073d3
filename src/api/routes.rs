//! API Routes
//!
//! Configures the Axum router with all endpoints and their rate-limit
//! policies.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_product_handler, delete_product_handler, flush_handler, get_product_handler,
    health_handler, list_products_handler, stats_handler, top_rated_handler,
    update_product_handler, AppState,
};
use crate::ratelimit::{rate_limit_middleware, PolicyKind, RateLimitGuard};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check (unlimited)
/// - `GET /cache/stats` - Per-namespace cache statistics (unlimited)
/// - `POST /cache/flush` - Reset the product cache (admin policy)
/// - `GET /products`, `GET /products/top-rated`, `GET /products/:id`
///   (default policy)
/// - `POST /products`, `PUT /products/:id`, `DELETE /products/:id`
///   (strict policy)
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let reads = Router::new()
        .route("/products", get(list_products_handler))
        .route("/products/top-rated", get(top_rated_handler))
        .route("/products/:id", get(get_product_handler));

    let writes = Router::new()
        .route("/products", post(create_product_handler))
        .route(
            "/products/:id",
            put(update_product_handler).delete(delete_product_handler),
        );

    let admin = Router::new().route("/cache/flush", post(flush_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache/stats", get(stats_handler))
        .merge(rate_limited(reads, &state, PolicyKind::Default))
        .merge(rate_limited(writes, &state, PolicyKind::Strict))
        .merge(rate_limited(admin, &state, PolicyKind::Admin))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Puts every route of `router` behind the policy `kind`.
fn rate_limited(
    router: Router<AppState>,
    state: &AppState,
    kind: PolicyKind,
) -> Router<AppState> {
    let guard = RateLimitGuard::new(state.limiter.clone(), kind)
        .enabled(state.rate_limit_enabled)
        .trust_proxy(state.trust_proxy);
    router.route_layer(middleware::from_fn_with_state(guard, rate_limit_middleware))
}
