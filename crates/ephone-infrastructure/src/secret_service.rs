//! Secret service implementation.
//!
//! Loads API keys from `secret.json`, with the `GEMINI_API_KEY` environment
//! variable taking precedence.

use crate::paths::EphonePaths;
use ephone_core::config::{GeminiSecret, SecretConfig};
use ephone_core::error::{EphoneError, Result};
use std::path::{Path, PathBuf};

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Service for loading secret configuration.
///
/// Secrets are never logged; error messages only mention the file path.
#[derive(Debug, Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
}

impl SecretServiceImpl {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_paths(paths: &EphonePaths) -> Result<Self> {
        let path = paths
            .secret_file()
            .map_err(|e| EphoneError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the secret file (missing file = no secrets) and applies the
    /// environment override.
    pub async fn load_secrets(&self) -> Result<SecretConfig> {
        let mut secrets = match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice::<SecretConfig>(&bytes).map_err(|_| {
                EphoneError::config(format!("Malformed secret file {}", self.path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SecretConfig::default(),
            Err(err) => return Err(err.into()),
        };

        if let Some(api_key) = std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
        {
            secrets.gemini = Some(GeminiSecret { api_key });
        }

        Ok(secrets)
    }

    /// Returns the Gemini API key or a config error naming where to put it.
    pub async fn gemini_api_key(&self) -> Result<String> {
        self.load_secrets()
            .await?
            .gemini
            .map(|gemini| gemini.api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                EphoneError::config(format!(
                    "Gemini API key not configured: set {} or add it to {}",
                    GEMINI_API_KEY_ENV,
                    self.path.display()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_key_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini": {"api_key": "file-key"}}"#).unwrap();

        let secrets = SecretServiceImpl::new(&path).load_secrets().await.unwrap();
        // The environment override may be set on CI machines.
        if std::env::var(GEMINI_API_KEY_ENV).is_err() {
            assert_eq!(secrets.gemini.unwrap().api_key, "file-key");
        }
    }

    #[tokio::test]
    async fn test_malformed_file_does_not_echo_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini": "sk-very-secret"#).unwrap();

        let err = SecretServiceImpl::new(&path).load_secrets().await.unwrap_err();
        assert!(!err.to_string().contains("sk-very-secret"));
    }
}
