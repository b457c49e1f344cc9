//! Catalog client over a fixed product list.

use async_trait::async_trait;
use ephone_core::error::{EphoneError, Result};
use ephone_core::product::{CatalogClient, Product, ProductId};
use std::path::Path;

/// Serves a fixed product list, e.g. a JSON dump of the remote catalog.
///
/// Backs the CLI's offline mode and the engine tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogClient {
    products: Vec<Product>,
}

impl StaticCatalogClient {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Loads products from a JSON array file in the remote catalog's format.
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            EphoneError::io(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let products: Vec<Product> = serde_json::from_slice(&bytes)?;
        Ok(Self::new(products))
    }
}

#[async_trait]
impl CatalogClient for StaticCatalogClient {
    async fn list_products(&self, limit: usize, offset: usize) -> Result<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.products
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or_else(|| EphoneError::not_found("product", id.to_string()))
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        let mut categories: Vec<String> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category) {
                categories.push(product.category.clone());
            }
        }
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StaticCatalogClient {
        StaticCatalogClient::new(vec![
            Product::new(1, "A", "electronics", 1.0),
            Product::new(2, "B", "jewelery", 2.0),
            Product::new(3, "C", "electronics", 3.0),
        ])
    }

    #[tokio::test]
    async fn test_paging_window() {
        let page = client().list_products(2, 1).await.unwrap();
        let ids: Vec<_> = page.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_categories_are_unique_in_first_seen_order() {
        let categories = client().list_categories().await.unwrap();
        assert_eq!(categories, vec!["electronics", "jewelery"]);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let err = client().get_product(42).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
