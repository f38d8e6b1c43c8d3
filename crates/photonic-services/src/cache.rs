//! Cache store abstraction
//!
//! Values are JSON so any backend (in-process, Redis, the host application's
//! own cache) can hold them.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use photonic_core::AppError;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

const DEFAULT_CAPACITY: usize = 1024;

/// Key/value cache with per-entry TTL
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a live entry. Expired entries read as missing.
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, AppError>;

    /// Store an entry for `ttl`. A zero TTL stores nothing.
    async fn put(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<(), AppError>;

    async fn forget(&self, key: &str) -> Result<(), AppError>;
}

struct CacheEntry {
    value: JsonValue,
    expires_at: Instant,
}

/// Capacity-bounded LRU cache kept in process memory
pub struct InMemoryCacheStore {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, AppError> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            tracing::trace!(key = %key, "Cache entry expired");
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<(), AppError> {
        if ttl.is_zero() {
            return Ok(());
        }

        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| AppError::Cache(format!("TTL out of range for key {}", key)))?;

        self.entries
            .lock()
            .await
            .put(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<(), AppError> {
        self.entries.lock().await.pop(key);
        Ok(())
    }
}
