//! Unified path management for ephone files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/ephone/            # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! └── logs/                    # Application logs
//!     └── ephone.log.YYYY-MM-DD
//!
//! ~/.local/share/ephone/       # Data directory
//! └── store/                   # Key-value snapshots (cart, chat history)
//! ```
//!
//! A base path override relocates both trees under a single directory, which
//! is what tests and `--data-dir` use.

use std::path::{Path, PathBuf};

const APP_NAME: &str = "ephone";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves every path ephone reads or writes.
#[derive(Debug, Clone, Default)]
pub struct EphonePaths {
    base: Option<PathBuf>,
}

impl EphonePaths {
    /// Creates a resolver. `base` overrides the platform directories.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the ephone configuration directory (e.g., `~/.config/ephone/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_NAME))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the ephone data directory (e.g., `~/.local/share/ephone/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_NAME))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Directory holding one file per key-value entry.
    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("store"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
