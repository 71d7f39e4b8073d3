//! Catalog records as the source of truth stores them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: u64,
    pub stock: u32,
    /// Average review rating, 0.0 when unreviewed
    pub rating: f64,
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price_cents: u64,
    #[serde(default)]
    pub stock: u32,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price_cents: Option<u64>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
}

impl ProductUpdate {
    /// Applies the present fields to `product` and bumps `updated_at`.
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price_cents) = self.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
        if let Some(review_count) = self.review_count {
            product.review_count = review_count;
        }
        product.updated_at = now;
    }
}

/// One page of the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        let epoch = Utc::now();
        Product {
            id: 1,
            name: "Desk lamp".to_string(),
            description: String::new(),
            category: "lighting".to_string(),
            price_cents: 2_500,
            stock: 3,
            rating: 0.0,
            review_count: 0,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    #[test]
    fn test_update_applies_present_fields_only() {
        let mut p = product();
        let now = Utc::now();
        ProductUpdate {
            price_cents: Some(1_999),
            rating: Some(4.5),
            ..Default::default()
        }
        .apply(&mut p, now);

        assert_eq!(p.price_cents, 1_999);
        assert_eq!(p.rating, 4.5);
        assert_eq!(p.name, "Desk lamp");
        assert_eq!(p.updated_at, now);
    }

    #[test]
    fn test_new_product_defaults() {
        let new: NewProduct = serde_json::from_str(r#"{"name":"Mug","price_cents":900}"#).unwrap();
        assert_eq!(new.stock, 0);
        assert!(new.description.is_empty());
    }
}
