//! Key-value storage trait.
//!
//! Defines the durable storage the cart ledger and chat session persist
//! their snapshots into.

use crate::error::Result;
use async_trait::async_trait;

/// Storage key of the persisted cart snapshot.
pub const CART_STORAGE_KEY: &str = "@e-phone:cart";

/// Storage key of the persisted chat transcript.
pub const CHAT_STORAGE_KEY: &str = "@e-phone:chat-history";

/// An abstract string-keyed byte store.
///
/// # Implementation Notes
///
/// Implementations should make `set` all-or-nothing: a reader must observe
/// either the previous value or the new one, never a partial write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))`: Value found
    /// - `Ok(None)`: Nothing stored under that key
    /// - `Err(_)`: Storage failure
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Deletes `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}
