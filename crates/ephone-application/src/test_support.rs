//! Test doubles shared by the engine tests.

use crate::shopping_assistant::ShoppingAssistant;
use async_trait::async_trait;
use ephone_core::config::AssistantConfig;
use ephone_core::error::{EphoneError, Result};
use ephone_core::generation::TextGenerator;
use ephone_core::product::{CatalogClient, Product, ProductId};
use ephone_core::storage::KeyValueStore;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn product(id: ProductId, title: &str, category: &str) -> Product {
    Product::new(id, title, category, 10.0 + id as f64)
}

/// `count` products with ids `1..=count`, titled "Product {id}".
pub fn numbered_catalog(count: u64) -> Vec<Product> {
    (1..=count)
        .map(|id| product(id, &format!("Product {id}"), "general"))
        .collect()
}

pub fn assistant_with(generator: ScriptedGenerator, config: AssistantConfig) -> ShoppingAssistant {
    ShoppingAssistant::new(Arc::new(generator), config).unwrap()
}

/// In-memory store that counts writes.
#[derive(Default)]
pub struct RecordingStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl RecordingStore {
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(EphoneError::io("disk unavailable"))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<()> {
        Err(EphoneError::io("disk unavailable"))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(EphoneError::io("disk unavailable"))
    }
}

/// Generator that replays queued replies, then fails.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedGenerator {
    pub fn replies<const N: usize>(replies: [&str; N]) -> Self {
        Self::scripted(replies.into_iter().map(|r| Ok(r.to_string())))
    }

    pub fn scripted(replies: impl IntoIterator<Item = Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Arc::default(),
            gate: None,
        }
    }

    pub fn failing() -> Self {
        Self::scripted(Vec::<Result<String>>::new())
    }

    /// Every call waits for a notification on [`gate`](Self::gate) first.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn gate(&self) -> Arc<Notify> {
        self.gate.clone().expect("generator is not gated")
    }

    /// Shared log of every prompt received.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EphoneError::generation("no scripted reply left")))
    }
}

/// Catalog over a fixed list whose bulk listing can be made to fail once.
pub struct TestCatalog {
    products: Vec<Product>,
    fail_next: AtomicBool,
    invalidations: AtomicUsize,
}

impl TestCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            fail_next: AtomicBool::new(false),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn fail_next_list_all(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for TestCatalog {
    async fn list_products(&self, limit: usize, offset: usize) -> Result<Vec<Product>> {
        Ok(self.products.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(EphoneError::transport("connection reset", true));
        }
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| EphoneError::not_found("Product", id.to_string()))
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        let mut categories: Vec<String> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category) {
                categories.push(product.category.clone());
            }
        }
        Ok(categories)
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Catalog whose bulk listing blocks until [`open`](Self::open) is called.
pub struct GatedCatalog {
    inner: TestCatalog,
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            inner: TestCatalog::new(products),
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for GatedCatalog {
    async fn list_products(&self, limit: usize, offset: usize) -> Result<Vec<Product>> {
        self.inner.list_products(limit, offset).await
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.inner.list_all().await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.inner.get_product(id).await
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        self.inner.list_categories().await
    }
}
