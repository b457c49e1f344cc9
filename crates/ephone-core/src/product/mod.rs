//! Product catalog domain.
//!
//! Contains the immutable product value, the catalog client contract and the
//! local (non-AI) search used both for plain search and as the fallback of
//! every AI-assisted path.

pub mod catalog;
pub mod model;
pub mod search;

pub use catalog::CatalogClient;
pub use model::{Product, ProductId, Rating};
pub use search::{dedup_by_id, filter_products, matches_query, resolve_ids};
