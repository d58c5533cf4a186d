//! Cache Provider Port
//!
//! Port for the key-value store that keeps parsed definitions between
//! process starts. Backends: in-memory, process-shared memory, filesystem,
//! Redis and Memcached.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache Entry Configuration
///
/// `ttl = None` stores the entry until it is deleted or the backend is
/// flushed, which is how parsed definitions are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntryConfig {
    /// Time to live for the cache entry
    pub ttl: Option<Duration>,
}

impl CacheEntryConfig {
    /// Entry that never expires
    pub fn new() -> Self {
        Self { ttl: None }
    }

    /// Set the TTL for the cache entry
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set TTL in seconds
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.ttl = Some(Duration::from_secs(secs));
        self
    }

    /// TTL in whole seconds, `None` when the entry does not expire
    pub fn ttl_secs(&self) -> Option<u64> {
        self.ttl.map(|ttl| ttl.as_secs().max(1))
    }
}

/// Cache Operation Statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of cache entries
    pub entries: u64,
    /// Cache hit rate (0.0 to 1.0)
    pub hit_rate: f64,
}

impl CacheStats {
    /// Create empty cache statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hit and refresh the hit rate
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.hit_rate = self.calculate_hit_rate();
    }

    /// Record a miss and refresh the hit rate
    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.hit_rate = self.calculate_hit_rate();
    }

    /// Calculate hit rate from hits and misses
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Cache Provider Port
///
/// JSON string storage keyed by string. Implementations must be safe to
/// share across threads; the bootstrap holds them as `Arc<dyn CacheProvider>`.
///
/// # Example
///
/// ```ignore
/// let config = CacheEntryConfig::new();
/// cache.set_json("definitions:/etc/app/container.toml", &json, config).await?;
///
/// if let Some(json) = cache.get_json("definitions:/etc/app/container.toml").await? {
///     let file: DefinitionFile = serde_json::from_str(&json)?;
/// }
/// ```
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    /// Get a value from the cache as JSON string
    ///
    /// Returns `None` when the key is absent or expired.
    async fn get_json(&self, key: &str) -> Result<Option<String>>;

    /// Set a value in the cache from JSON string
    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;

    /// Delete a value from the cache
    ///
    /// Returns true if the key was deleted, false if it didn't exist
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Check if a key exists in the cache
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Clear all values from the cache
    async fn clear(&self) -> Result<()>;

    /// Get cache statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Get the cache size (number of entries)
    async fn size(&self) -> Result<usize>;

    /// Delete every key starting with `prefix`
    ///
    /// Returns the number of keys removed. Keys outside the prefix are never
    /// touched, so handles sharing one backend under different prefixes stay
    /// isolated.
    async fn clear_prefix(&self, prefix: &str) -> Result<usize>;

    /// Number of live keys starting with `prefix`
    async fn size_prefix(&self, prefix: &str) -> Result<usize>;

    /// Identifier of this provider implementation (e.g. "memory", "redis")
    fn provider_name(&self) -> &str;
}
