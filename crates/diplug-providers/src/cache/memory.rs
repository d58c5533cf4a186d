//! Moka in-memory cache provider
//!
//! Process-local, non-persistent cache. This is what every non-production
//! process gets, whatever backend the configuration names, so development
//! runs never write to shared infrastructure.
//!
//! ## Example
//!
//! ```ignore
//! use diplug_providers::cache::MemoryCacheProvider;
//!
//! let provider = MemoryCacheProvider::with_capacity(1000);
//! ```

use crate::constants::MEMORY_CACHE_DEFAULT_CAPACITY;
use async_trait::async_trait;
use diplug_domain::error::Result;
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use moka::Expiry;
use moka::future::Cache;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct MemoryEntry {
    json: Arc<str>,
    ttl: Option<Duration>,
}

/// Per-entry expiry driven by [`CacheEntryConfig::ttl`]
struct EntryExpiry;

impl Expiry<String, MemoryEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Moka-based in-memory cache provider
#[derive(Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, MemoryEntry>,
    capacity: u64,
    stats: Arc<RwLock<CacheStats>>,
}

impl Default for MemoryCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCacheProvider {
    /// Create a new memory cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_CACHE_DEFAULT_CAPACITY)
    }

    /// Create a new memory cache holding at most `capacity` entries
    pub fn with_capacity(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .expire_after(EntryExpiry)
            .build();

        Self {
            cache,
            capacity,
            stats: Arc::new(RwLock::new(CacheStats::new())),
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<Arc<String>> {
        self.cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect()
    }

    fn record(&self, hit: bool) {
        if let Ok(mut stats) = self.stats.write() {
            if hit {
                stats.record_hit();
            } else {
                stats.record_miss();
            }
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let entry = self.cache.get(key).await;
        self.record(entry.is_some());
        Ok(entry.map(|e| e.json.to_string()))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let entry = MemoryEntry {
            json: Arc::from(value),
            ttl: config.ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        // Run pending tasks to ensure entry_count is accurate
        self.cache.run_pending_tasks().await;
        let mut stats = self.stats.read().map(|s| s.clone()).unwrap_or_default();
        stats.entries = self.cache.entry_count();
        Ok(stats)
    }

    async fn size(&self) -> Result<usize> {
        self.cache.run_pending_tasks().await;
        Ok(usize::try_from(self.cache.entry_count()).unwrap_or(usize::MAX))
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        let keys = self.keys_with_prefix(prefix);
        for key in &keys {
            self.cache.invalidate(key.as_str()).await;
        }
        self.cache.run_pending_tasks().await;
        Ok(keys.len())
    }

    async fn size_prefix(&self, prefix: &str) -> Result<usize> {
        self.cache.run_pending_tasks().await;
        Ok(self.keys_with_prefix(prefix).len())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheProvider")
            .field("capacity", &self.capacity)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
