//! Generic async cache with TTL support.
//!
//! Backs the two pieces of transient identity state: pending signups (draft +
//! code) and sessions. Entries carry an explicit expiry and are swept by a
//! background task; reads never return an expired entry even before the sweep.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A cache entry with optional expiration time.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    /// None means no expiration
    expires_at: Option<DateTime<Utc>>,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl_seconds: Option<u64>) -> Self {
        Self {
            value,
            expires_at: ttl_seconds.map(|ttl| Utc::now() + Duration::seconds(ttl as i64)),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false)
    }
}

/// Cache configuration options.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Background cleanup interval in seconds (default: 60)
    pub cleanup_interval_seconds: u64,
    /// Default TTL in seconds for entries (None means no expiration)
    pub default_ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: 60,
            default_ttl_seconds: None,
        }
    }
}

/// Local backend implementation using DashMap.
#[derive(Debug)]
pub struct LocalBackend<V> {
    storage: Arc<DashMap<String, CacheEntry<V>>>,
    /// Only the original backend owns the sweeper; clones share storage.
    cleanup_task: Option<JoinHandle<()>>,
    config: CacheConfig,
}

impl<V> LocalBackend<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    fn new(config: CacheConfig) -> Self {
        let storage = Arc::new(DashMap::new());
        let cleanup_task = Some(Self::spawn_cleanup_task(
            Arc::clone(&storage),
            config.cleanup_interval_seconds,
        ));

        Self {
            storage,
            cleanup_task,
            config,
        }
    }

    fn spawn_cleanup_task(
        storage: Arc<DashMap<String, CacheEntry<V>>>,
        interval_seconds: u64,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds.max(1)));
            loop {
                interval.tick().await;
                let before = storage.len();
                let now = Utc::now();
                storage.retain(|_, entry| entry.expires_at.map(|exp| exp > now).unwrap_or(true));
                let removed = before.saturating_sub(storage.len());
                if removed > 0 {
                    tracing::debug!(removed, "Swept expired cache entries");
                }
            }
        })
    }

    fn get(&self, key: &str) -> Option<V> {
        self.storage
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: V) {
        let entry = CacheEntry::new(value, self.config.default_ttl_seconds);
        self.storage.insert(key.to_string(), entry);
    }

    fn set_ex(&self, key: &str, value: V, ttl_seconds: u64) {
        self.storage
            .insert(key.to_string(), CacheEntry::new(value, Some(ttl_seconds)));
    }

    fn take(&self, key: &str) -> Option<V> {
        self.storage
            .remove(key)
            .map(|(_, entry)| entry)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value)
    }

    fn delete(&self, key: &str) -> bool {
        self.storage.remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.storage.iter().filter(|entry| !entry.is_expired()).count()
    }

    fn remove_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&V) -> bool,
    {
        let before = self.storage.len();
        self.storage.retain(|_, entry| !predicate(&entry.value));
        before.saturating_sub(self.storage.len())
    }
}

impl<V> Drop for LocalBackend<V> {
    fn drop(&mut self) {
        if let Some(task) = self.cleanup_task.take() {
            task.abort();
        }
    }
}

/// Generic cache enum with extensible backend variants.
///
/// Only the local backend exists today; values stay serializable so a shared
/// backend can be added without touching callers.
///
/// # Example
/// ```rust,no_run
/// # async fn demo() -> reva::error::Result<()> {
/// use reva::cache::{Cache, CacheConfig};
///
/// let cache: Cache<String> = Cache::new_local(CacheConfig::default());
/// cache.set_ex("signup:a@b.example", "123456".to_string(), 900).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub enum Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    LocalCache(LocalBackend<V>),
}

impl<V> Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    /// Create a new local cache. Must be called inside a Tokio runtime.
    pub fn new_local(config: CacheConfig) -> Self {
        Self::LocalCache(LocalBackend::new(config))
    }

    /// Get a value by key; expired entries read as absent.
    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        match self {
            Self::LocalCache(backend) => Ok(backend.get(key)),
        }
    }

    /// Check if a key exists and is not expired.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Set a value with the default TTL (if any).
    pub async fn set(&self, key: &str, value: V) -> Result<()> {
        match self {
            Self::LocalCache(backend) => {
                backend.set(key, value);
                Ok(())
            }
        }
    }

    /// Set a value with expiration in seconds.
    pub async fn set_ex(&self, key: &str, value: V, ttl_seconds: u64) -> Result<()> {
        match self {
            Self::LocalCache(backend) => {
                backend.set_ex(key, value, ttl_seconds);
                Ok(())
            }
        }
    }

    /// Remove a key and return its value if it was present and not expired.
    pub async fn take(&self, key: &str) -> Result<Option<V>> {
        match self {
            Self::LocalCache(backend) => Ok(backend.take(key)),
        }
    }

    /// Delete a key (returns true if key existed).
    pub async fn delete(&self, key: &str) -> Result<bool> {
        match self {
            Self::LocalCache(backend) => Ok(backend.delete(key)),
        }
    }

    /// Number of live (non-expired) entries.
    pub async fn len(&self) -> Result<usize> {
        match self {
            Self::LocalCache(backend) => Ok(backend.len()),
        }
    }

    /// Delete every entry whose value matches; returns how many were removed.
    pub async fn remove_where<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&V) -> bool,
    {
        match self {
            Self::LocalCache(backend) => Ok(backend.remove_where(predicate)),
        }
    }
}

impl<V> Clone for Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        match self {
            // Shares storage; the sweeper stays with the original backend.
            Self::LocalCache(backend) => Self::LocalCache(LocalBackend {
                storage: Arc::clone(&backend.storage),
                cleanup_task: None,
                config: backend.config.clone(),
            }),
        }
    }
}
