//! Source of truth for catalog records.
//!
//! The cache layer treats the repository as opaque: every call either
//! produces a value or fails with a `RepositoryError`.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::catalog::{NewProduct, Product, ProductPage, ProductUpdate};
use crate::error::RepositoryError;

// == Repository Trait ==
/// Record operations on the system of record.
pub trait ProductRepository: Send + Sync + 'static {
    fn find_by_id(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// `page` is 1-based.
    fn list(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<ProductPage, RepositoryError>> + Send;

    /// Highest rated products first, ties broken by review count then id.
    fn top_rated(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    fn insert(
        &self,
        new: NewProduct,
    ) -> impl Future<Output = Result<Product, RepositoryError>> + Send;

    /// Returns the updated record, or None if `id` does not exist.
    fn update(
        &self,
        id: u64,
        update: ProductUpdate,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// Returns whether a record was removed.
    fn delete(&self, id: u64) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

// == In-Memory Repository ==
/// Process-local repository backing the server binary and tests.
///
/// Counts read calls so callers can observe whether a lookup reached the
/// source, and can be switched into an unavailable state.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    records: RwLock<BTreeMap<u64, Product>>,
    next_id: AtomicU64,
    reads: AtomicUsize,
    unavailable: AtomicBool,
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            reads: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Number of read operations served so far.
    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable(
                "product store is not accepting requests".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn begin_read(&self) -> Result<(), RepositoryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }
}

impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: u64) -> Result<Option<Product>, RepositoryError> {
        self.begin_read()?;
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list(&self, page: u32, per_page: u32) -> Result<ProductPage, RepositoryError> {
        self.begin_read()?;
        let records = self.records.read().await;
        let page = page.max(1);
        let skip = (page as usize - 1).saturating_mul(per_page as usize);

        Ok(ProductPage {
            items: records
                .values()
                .skip(skip)
                .take(per_page as usize)
                .cloned()
                .collect(),
            page,
            per_page,
            total: records.len() as u64,
        })
    }

    async fn top_rated(&self, limit: usize) -> Result<Vec<Product>, RepositoryError> {
        self.begin_read()?;
        let mut products: Vec<Product> = self.records.read().await.values().cloned().collect();
        products.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then(b.review_count.cmp(&a.review_count))
                .then(a.id.cmp(&b.id))
        });
        products.truncate(limit);
        Ok(products)
    }

    async fn insert(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        self.check_available()?;
        let mut records = self.records.write().await;

        if records
            .values()
            .any(|p| p.name.eq_ignore_ascii_case(&new.name))
        {
            return Err(RepositoryError::Conflict(format!(
                "a product named '{}' already exists",
                new.name
            )));
        }

        let now = Utc::now();
        let product = Product {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: new.name,
            description: new.description,
            category: new.category,
            price_cents: new.price_cents,
            stock: new.stock,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        };
        records.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: u64,
        update: ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|product| {
            update.apply(product, Utc::now());
            product.clone()
        }))
    }

    async fn delete(&self, id: u64) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.records.write().await.remove(&id).is_some())
    }
}
