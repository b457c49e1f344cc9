//! Error types for the ephone storefront core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole storefront core.
///
/// Typed, structured variants with automatic conversion from the common
/// error types via `From`. Collaborator failures (catalog HTTP, AI service,
/// storage) all end up here so engines can decide per variant whether to
/// degrade, log or surface.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum EphoneError {
    /// A product or other catalog entity does not exist
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// Local file or store I/O failure
    #[error("IO error: {message}")]
    Io { message: String },

    /// Remote catalog transport error
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        message: String,
        status: Option<u16>,
        is_retryable: bool,
    },

    /// Data access error (key-value storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Snapshot, config or response payload could not be encoded or decoded
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generative AI service error
    #[error("Generation error: {message}")]
    Generation {
        message: String,
        is_retryable: bool,
        retry_after_secs: Option<u64>,
    },

    /// Broken invariant, e.g. an invalid built-in prompt template
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EphoneError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Transport error without an HTTP status (connect failures, body decode).
    pub fn transport(message: impl Into<String>, is_retryable: bool) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
            is_retryable,
        }
    }

    /// Creates a Transport error for a non-success HTTP status.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
            is_retryable: matches!(status, 429 | 500 | 502 | 503 | 504),
        }
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            is_retryable: false,
            retry_after_secs: None,
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is an AI service error
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    /// Whether repeating the same call later may succeed.
    ///
    /// Transport and generation errors carry the flag decided at the
    /// collaborator boundary; IO errors are always worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { is_retryable, .. } | Self::Generation { is_retryable, .. } => {
                *is_retryable
            }
            Self::Io { .. } => true,
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for EphoneError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for EphoneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for EphoneError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for EphoneError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, EphoneError>`.
pub type Result<T> = std::result::Result<T, EphoneError>;
