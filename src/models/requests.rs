//! Request DTOs for the HTTP surface
//!
//! Defines the structure of incoming request bodies and query strings.

use serde::Deserialize;

use crate::catalog::{NewProduct, ProductUpdate};

/// Longest accepted product name, in characters
pub const MAX_NAME_LENGTH: usize = 200;

/// Query string for GET /products
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// 1-based page number
    #[serde(default)]
    pub page: Option<u32>,
}

impl ListQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Request body for POST /products
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    #[serde(flatten)]
    pub product: NewProduct,
}

impl CreateProductRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_name(&self.product.name)
    }
}

/// Request body for PUT /products/:id
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(flatten)]
    pub update: ProductUpdate,
}

impl UpdateProductRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(name) = &self.update.name {
            if let Some(msg) = validate_name(name) {
                return Some(msg);
            }
        }
        if let Some(rating) = self.update.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Some("Rating must be between 0 and 5".to_string());
            }
        }
        None
    }
}

fn validate_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some("Name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Some(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        ));
    }
    None
}
