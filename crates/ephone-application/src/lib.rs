//! Application layer for the e-phone shopping core.
//!
//! This crate provides the stateful engines that coordinate the domain model
//! with the catalog, storage and AI collaborators: the paginated product
//! feed, the persisted cart ledger, the shopping assistant and the chat
//! session.

pub mod cart_ledger;
pub mod chat_session;
pub mod persistence;
pub mod product_feed;
pub mod shopping_assistant;

#[cfg(test)]
mod test_support;

pub use cart_ledger::CartLedger;
pub use chat_session::{ChatSession, SEND_ERROR_MESSAGE, SendOutcome};
pub use persistence::{SnapshotWriter, load_snapshot};
pub use product_feed::{
    AiSearchOutcome, FeedView, LOAD_ERROR_MESSAGE, LoadOutcome, PageOutcome, ProductFeed,
};
pub use shopping_assistant::{
    RecommendationError, RecommendationKind, Recommendations, ShoppingAssistant,
};
