//! Catalog Module
//!
//! Product records, their source of truth, and the lookup service that
//! fronts it with the read-through cache.

mod model;
mod repository;
mod service;

pub use model::{NewProduct, Product, ProductPage, ProductUpdate};
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::{
    page_cache_id, ProductCatalog, DEFAULT_PER_PAGE, TOP_RATED_ID, TOP_RATED_LIMIT,
};
