//! Catalog lookups and mutations with read-through caching.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{NewProduct, Product, ProductPage, ProductRepository, ProductUpdate};
use crate::error::RepositoryError;
use crate::readthrough::ReadThroughCache;

/// Products per listing page.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Size of the top-rated ranking.
pub const TOP_RATED_LIMIT: usize = 10;

/// Cache id of the top-rated ranking.
pub const TOP_RATED_ID: &str = "top-rated";

/// Cache id of listing page `page`.
pub fn page_cache_id(page: u32) -> String {
    format!("all-{}", page)
}

// == Product Catalog ==
/// Record-lookup service for products.
///
/// Reads go through the cache; writes hit the repository first and then
/// refresh or drop the affected single-record entry. Listing pages and the
/// top-rated ranking expire on their own TTL rather than on writes.
#[derive(Debug)]
pub struct ProductCatalog<R> {
    repository: Arc<R>,
    cache: ReadThroughCache,
    per_page: u32,
}

impl<R: ProductRepository> ProductCatalog<R> {
    pub fn new(repository: Arc<R>, cache: ReadThroughCache) -> Self {
        Self {
            repository,
            cache,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn cache(&self) -> &ReadThroughCache {
        &self.cache
    }

    pub async fn get_product(&self, id: u64) -> Result<Option<Product>, RepositoryError> {
        self.cache
            .fetch(&id.to_string(), || self.repository.find_by_id(id))
            .await
    }

    /// Listing page `page` (1-based; 0 is treated as 1).
    pub async fn list_products(&self, page: u32) -> Result<ProductPage, RepositoryError> {
        let page = page.max(1);
        let per_page = self.per_page;
        let listing = self
            .cache
            .fetch_aggregate(&page_cache_id(page), || async move {
                self.repository.list(page, per_page).await.map(Some)
            })
            .await?;

        Ok(listing.unwrap_or_else(|| ProductPage {
            items: Vec::new(),
            page,
            per_page,
            total: 0,
        }))
    }

    pub async fn top_rated(&self) -> Result<Vec<Product>, RepositoryError> {
        let ranking = self
            .cache
            .fetch_aggregate(TOP_RATED_ID, || async {
                self.repository.top_rated(TOP_RATED_LIMIT).await.map(Some)
            })
            .await?;

        Ok(ranking.unwrap_or_default())
    }

    /// Inserts a product and caches it under its own id straight away.
    pub async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let product = self.repository.insert(new).await?;
        self.cache.populate(&product.id.to_string(), &product).await;
        info!("Created product {}", product.id);
        Ok(product)
    }

    /// Applies `update`; on success the cached record is dropped so the next
    /// lookup re-reads the source.
    pub async fn update_product(
        &self,
        id: u64,
        update: ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let updated = self.repository.update(id, update).await?;
        let stats = self.cache.invalidate(&[id.to_string()]).await;
        debug!(
            "Updated product {} ({} invalidations so far)",
            id, stats.invalidations
        );
        Ok(updated)
    }

    /// Removes a product and drops its cached record.
    pub async fn delete_product(&self, id: u64) -> Result<bool, RepositoryError> {
        let removed = self.repository.delete(id).await?;
        let stats = self.cache.invalidate(&[id.to_string()]).await;
        debug!(
            "Deleted product {} ({} invalidations so far)",
            id, stats.invalidations
        );
        Ok(removed)
    }
}
