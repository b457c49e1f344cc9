pub mod cart;
pub mod catalog;
pub mod chat;
pub mod output;
pub mod recommend;

use anyhow::{Context, Result};
use clap::Args;
use ephone_application::{CartLedger, ChatSession, ProductFeed, ShoppingAssistant};
use ephone_core::config::AppConfig;
use ephone_core::generation::TextGenerator;
use ephone_core::product::CatalogClient;
use ephone_core::storage::KeyValueStore;
use ephone_infrastructure::{
    ConfigService, EphonePaths, FileKeyValueStore, HttpCatalogClient, InMemoryStore,
    SecretServiceImpl, StaticCatalogClient,
};
use ephone_interaction::{DisabledGenerator, GeminiApiAgent};
use std::path::PathBuf;
use std::sync::Arc;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Keep config, data and logs under this directory instead of the platform defaults
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Serve the catalog from a JSON file instead of the remote API
    #[arg(long, global = true)]
    pub catalog_file: Option<PathBuf>,

    /// Keep cart and chat history in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

/// Collaborators wired from configuration, shared by the subcommands.
pub struct AppContext {
    pub config: AppConfig,
    pub catalog: Arc<dyn CatalogClient>,
    pub store: Arc<dyn KeyValueStore>,
    pub assistant: Arc<ShoppingAssistant>,
}

impl AppContext {
    pub async fn build(options: &GlobalOptions) -> Result<Self> {
        let paths = EphonePaths::new(options.data_dir.as_deref());
        let config = ConfigService::from_paths(&paths)?
            .get_config()
            .context("Failed to load configuration")?;

        let catalog: Arc<dyn CatalogClient> = match &options.catalog_file {
            Some(path) => Arc::new(
                StaticCatalogClient::from_json_file(path)
                    .await
                    .with_context(|| format!("Failed to load catalog file {}", path.display()))?,
            ),
            None => Arc::new(HttpCatalogClient::from_config(&config.catalog)?),
        };

        let store: Arc<dyn KeyValueStore> = if options.ephemeral {
            Arc::new(InMemoryStore::new())
        } else {
            let dir = match &config.storage.data_dir {
                Some(dir) => PathBuf::from(dir).join("store"),
                None => paths.store_dir()?,
            };
            let store = FileKeyValueStore::new(dir);
            tracing::debug!(path = %store.root().display(), "Using file store");
            Arc::new(store)
        };

        let generator = build_generator(&paths, &config).await;
        let assistant = Arc::new(ShoppingAssistant::new(generator, config.assistant.clone())?);
        tracing::info!(generator = assistant.generator_name(), "Shopping assistant ready");

        Ok(Self {
            config,
            catalog,
            store,
            assistant,
        })
    }

    pub fn feed(&self) -> ProductFeed {
        ProductFeed::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.assistant),
            &self.config.feed,
        )
    }

    /// A feed with its catalog snapshot already loaded.
    pub async fn loaded_feed(&self) -> Result<ProductFeed> {
        let feed = self.feed();
        feed.load().await.context("Failed to load products")?;
        Ok(feed)
    }

    pub async fn cart(&self) -> CartLedger {
        CartLedger::load(Arc::clone(&self.store)).await
    }

    pub async fn chat(&self) -> ChatSession {
        ChatSession::load(Arc::clone(&self.store), Arc::clone(&self.assistant)).await
    }
}

/// Gemini when a key is configured; otherwise a generator that always fails,
/// so every AI-assisted command takes its local fallback.
async fn build_generator(paths: &EphonePaths, config: &AppConfig) -> Arc<dyn TextGenerator> {
    let api_key = match SecretServiceImpl::from_paths(paths) {
        Ok(secrets) => secrets.gemini_api_key().await,
        Err(err) => Err(err),
    };

    match api_key {
        Ok(key) => {
            tracing::debug!(model = %config.assistant.model, "Using Gemini");
            Arc::new(GeminiApiAgent::new(key, config.assistant.model.clone()))
        }
        Err(err) => {
            tracing::warn!(error = %err, "AI features disabled");
            Arc::new(DisabledGenerator::new(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ephone_core::product::Product;
    use tempfile::TempDir;

    fn write_catalog(dir: &TempDir) -> PathBuf {
        let products = vec![
            Product::new(1, "Backpack", "bags", 109.95),
            Product::new(2, "Slim Fit Tee", "men's clothing", 22.3),
        ];
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, serde_json::to_vec(&products).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_offline_context_persists_cart_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let options = GlobalOptions {
            data_dir: Some(dir.path().to_path_buf()),
            catalog_file: Some(write_catalog(&dir)),
            ..GlobalOptions::default()
        };

        let ctx = AppContext::build(&options).await.unwrap();
        let feed = ctx.loaded_feed().await.unwrap();
        assert_eq!(feed.snapshot().catalog_len, 2);
        assert_eq!(feed.page_size(), 10);

        let cart = ctx.cart().await;
        cart.add_to_cart(&feed.product(1).await.unwrap());
        cart.flush().await;

        let reopened = AppContext::build(&options).await.unwrap();
        assert_eq!(reopened.cart().await.total_items(), 1);
        assert!(dir.path().join("data").join("store").exists());
    }

    #[tokio::test]
    async fn test_ephemeral_context_keeps_nothing() {
        let dir = TempDir::new().unwrap();
        let options = GlobalOptions {
            data_dir: Some(dir.path().to_path_buf()),
            catalog_file: Some(write_catalog(&dir)),
            ephemeral: true,
            ..GlobalOptions::default()
        };

        let ctx = AppContext::build(&options).await.unwrap();
        let cart = ctx.cart().await;
        cart.add_to_cart(&Product::new(1, "Backpack", "bags", 109.95));
        cart.flush().await;

        assert!(!dir.path().join("data").exists());
    }
}
