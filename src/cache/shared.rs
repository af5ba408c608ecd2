//! Shared Cache Handle
//!
//! The one piece of state shared between connection tasks.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheSnapshot, CacheStats, CacheStore, EvictionPolicy};
use crate::config::Config;

/// Cloneable handle to a single `CacheStore` behind one mutex.
///
/// Every lookup and insert takes the same lock, so an insert and the eviction
/// it triggers are never partially visible. The map itself is never exposed.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    inner: Arc<Mutex<CacheStore>>,
}

impl ResponseCache {
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheStore::new(capacity, policy))),
        }
    }

    /// Builds the cache described by the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_capacity, config.eviction_policy)
    }

    /// Returns the stored response for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let mut store = self.inner.lock().await;
        store.get(key)
    }

    /// Stores `response` under `key`, evicting one entry if the cache is full.
    pub async fn put(&self, key: String, response: Bytes) {
        let mut store = self.inner.lock().await;
        let evicted = store.put(key, response);
        debug!(
            entries = store.len(),
            evicted = evicted.is_some(),
            "stored response"
        );
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Reads statistics and configuration in one critical section, so the
    /// figures always describe the same cache state.
    pub async fn snapshot(&self) -> CacheSnapshot {
        self.inner.lock().await.snapshot()
    }
}
