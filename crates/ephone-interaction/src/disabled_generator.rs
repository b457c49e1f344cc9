//! Stand-in generator used when no AI credentials are configured.

use async_trait::async_trait;
use ephone_core::error::{EphoneError, Result};
use ephone_core::generation::TextGenerator;

/// Fails every request, so every AI-assisted path takes its local fallback.
#[derive(Debug, Clone)]
pub struct DisabledGenerator {
    reason: String,
}

impl DisabledGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(EphoneError::generation(format!(
            "AI service unavailable: {}",
            self.reason
        )))
    }
}
