//! Catalog client trait.
//!
//! Defines the interface to the remote product catalog.

use super::model::{Product, ProductId};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract client for the remote product catalog.
///
/// Decouples the listing engine from the transport (HTTP API, fixture
/// data, test doubles). Every call may fail with a transport error.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetches one page of products.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of products to return
    /// * `offset` - Number of products to skip
    async fn list_products(&self, limit: usize, offset: usize) -> Result<Vec<Product>>;

    /// Fetches the whole catalog in a single bulk call.
    async fn list_all(&self) -> Result<Vec<Product>>;

    /// Fetches a single product.
    ///
    /// # Returns
    ///
    /// - `Ok(Product)`: Product found
    /// - `Err(EphoneError::NotFound)`: No product with that id
    /// - `Err(_)`: Transport failure
    async fn get_product(&self, id: ProductId) -> Result<Product>;

    /// Lists the category names known to the catalog.
    async fn list_categories(&self) -> Result<Vec<String>>;

    /// Forgets anything cached so the next call goes back to the source.
    ///
    /// Clients without a cache keep the default no-op.
    async fn invalidate(&self) {}
}
