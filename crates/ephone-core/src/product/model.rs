//! Product value types.

use serde::{Deserialize, Serialize};

/// Catalog-wide product identifier.
pub type ProductId = u64;

/// Aggregated customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    /// Average score, 0 to 5.
    pub rate: f64,
    /// Number of ratings the average is built from.
    pub count: u64,
}

/// An immutable product as returned by the remote catalog.
///
/// Identity is `id`; the core never mutates a product after it has been
/// fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

impl Product {
    /// Minimal constructor, mostly useful for fixtures and fallbacks.
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            category: category.into(),
            price,
            image: String::new(),
            rating: Rating::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rating(mut self, rate: f64, count: u64) -> Self {
        self.rating = Rating { rate, count };
        self
    }
}
