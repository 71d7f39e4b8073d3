//! API Module
//!
//! Thin HTTP surface hosting the cache layer: catalog lookups and writes
//! behind the rate limiter, plus cache observability.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /cache/stats` - Cache statistics per namespace
//! - `POST /cache/flush` - Flush the product cache
//! - `GET|POST /products`, `GET /products/top-rated`
//! - `GET|PUT|DELETE /products/:id`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
