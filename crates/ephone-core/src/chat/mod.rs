//! Chat transcript domain.

pub mod message;

pub use message::{ChatMessage, ChatRole, MessageId, MessageIdGenerator};
