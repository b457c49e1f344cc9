pub mod cart;
pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod product;
pub mod storage;

// Re-export common error type
pub use error::{EphoneError, Result};

pub use cart::{Cart, CartLine, PriceSummary};
pub use chat::{ChatMessage, ChatRole, MessageId, MessageIdGenerator};
pub use generation::TextGenerator;
pub use product::{CatalogClient, Product, ProductId, Rating};
pub use storage::{CART_STORAGE_KEY, CHAT_STORAGE_KEY, KeyValueStore};
