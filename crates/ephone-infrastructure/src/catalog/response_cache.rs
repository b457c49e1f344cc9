//! Time-bounded in-memory cache for catalog responses.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct CachedEntry {
    data: Value,
    stored_at: Instant,
}

/// Caches decoded JSON bodies by request key for a fixed time-to-live.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached body for `key` if it is younger than the TTL.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.data.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, key: impl Into<String>, data: Value) {
        self.entries.lock().await.insert(
            key.into(),
            CachedEntry {
                data,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
