//! Application configuration model.
//!
//! Every field carries a serde default so a partial (or missing) config file
//! still produces a usable configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
    /// How long catalog responses are served from the in-memory cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FeedConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Artificial delay applied while a page is appended.
    #[serde(default)]
    pub load_more_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            load_more_delay_ms: 0,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,
    #[serde(default = "default_search_result_limit")]
    pub search_result_limit: usize,
    /// Number of prior transcript messages sent along with a chat turn.
    #[serde(default = "default_chat_history_window")]
    pub chat_history_window: usize,
    /// Number of catalog products described to the chat assistant.
    #[serde(default = "default_chat_product_context")]
    pub chat_product_context: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            recommendation_count: default_recommendation_count(),
            search_result_limit: default_search_result_limit(),
            chat_history_window: default_chat_history_window(),
            chat_product_context: default_chat_product_context(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

/// API keys, kept apart from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiSecret>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiSecret {
    pub api_key: String,
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    10
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_recommendation_count() -> usize {
    3
}

fn default_search_result_limit() -> usize {
    5
}

fn default_chat_history_window() -> usize {
    10
}

fn default_chat_product_context() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.feed.page_size, 10);
        assert_eq!(config.catalog.cache_ttl_secs, 300);
        assert_eq!(config.assistant.recommendation_count, 3);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [feed]
            load_more_delay_ms = 2000

            [assistant]
            model = "gemini-2.0-flash"
            "#,
        )
        .unwrap();

        assert_eq!(config.feed.load_more_delay_ms, 2000);
        assert_eq!(config.feed.page_size, 10);
        assert_eq!(config.assistant.model, "gemini-2.0-flash");
        assert_eq!(config.assistant.search_result_limit, 5);
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
    }
}
