//! Generative AI service trait.

use crate::error::Result;
use async_trait::async_trait;

/// A text-in, text-out generative model.
///
/// Treated as non-deterministic, rate limited and occasionally malformed:
/// callers must validate whatever comes back.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short human-readable name used in logs.
    fn name(&self) -> &str;

    /// Generates a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
