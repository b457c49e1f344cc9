//! Permissive parsing of model replies that should contain an id list.
//!
//! Models wrap answers in code fences, add prose around them, or ignore the
//! instructions altogether. Parsing therefore runs in two stages:
//!
//! 1. [`strip_code_fences`] removes the known wrapping markers.
//! 2. The first bracketed list of integers is located and decoded as JSON.

use ephone_core::product::ProductId;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("fence pattern is valid"));

static ID_ARRAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[\d\s,]+\]").expect("id array pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("No valid array found in AI response")]
    NoArray,
    #[error("Malformed id array '{fragment}': {reason}")]
    Malformed { fragment: String, reason: String },
}

/// Removes ```` ```json ```` / ```` ``` ```` markers and trims the result.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_PATTERN.replace_all(text, "").trim().to_string()
}

/// Extracts the first bracketed integer list from a model reply.
pub fn parse_id_list(text: &str) -> Result<Vec<ProductId>, ParseError> {
    let cleaned = strip_code_fences(text);
    let fragment = ID_ARRAY_PATTERN
        .find(&cleaned)
        .ok_or(ParseError::NoArray)?
        .as_str();

    serde_json::from_str::<Vec<ProductId>>(fragment).map_err(|err| ParseError::Malformed {
        fragment: fragment.to_string(),
        reason: err.to_string(),
    })
}
