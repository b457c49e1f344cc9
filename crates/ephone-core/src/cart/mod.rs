//! Shopping cart domain.
//!
//! The [`Cart`] here is the pure, storage-free half of the cart ledger:
//! every mutation rule lives on it so it can be tested without any
//! persistence collaborator.

pub mod model;

pub use model::{Cart, CartLine, PriceSummary};
