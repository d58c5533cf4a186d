//! Views over a cache provider
//!
//! Backends are shared as `Arc<dyn CacheProvider>`. [`NamespacedCache`] is
//! itself a provider and prefixes every key; [`TypedCache`] layers serde on
//! top of the JSON string interface.

use diplug_domain::constants::CACHE_NAMESPACE_SEPARATOR;
use diplug_domain::error::{Error, Result};
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Provider prefixing every key with `<namespace>:`
///
/// `clear`, `size` and the entry count in `stats` only see keys under the
/// namespace, so several namespaces can share one backend. Hit and miss
/// counters come from the underlying provider.
#[derive(Clone)]
pub struct NamespacedCache {
    inner: Arc<dyn CacheProvider>,
    namespace: String,
}

impl NamespacedCache {
    /// Wrap `inner` under `namespace`
    pub fn new<S: Into<String>>(inner: Arc<dyn CacheProvider>, namespace: S) -> Self {
        Self {
            inner,
            namespace: namespace.into(),
        }
    }

    /// Namespace applied to keys
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key as stored in the underlying provider
    pub fn namespaced_key(&self, key: &str) -> String {
        format!("{}{CACHE_NAMESPACE_SEPARATOR}{key}", self.namespace)
    }

    fn key_prefix(&self) -> String {
        self.namespaced_key("")
    }
}

#[async_trait::async_trait]
impl CacheProvider for NamespacedCache {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_json(&self.namespaced_key(key)).await
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        self.inner
            .set_json(&self.namespaced_key(key), value, config)
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(&self.namespaced_key(key)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(&self.namespaced_key(key)).await
    }

    async fn clear(&self) -> Result<()> {
        let removed = self.inner.clear_prefix(&self.key_prefix()).await?;
        tracing::debug!(namespace = %self.namespace, removed, "Cleared cache namespace");
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let mut stats = self.inner.stats().await?;
        stats.entries = self.size().await? as u64;
        Ok(stats)
    }

    async fn size(&self) -> Result<usize> {
        self.inner.size_prefix(&self.key_prefix()).await
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        self.inner.clear_prefix(&self.namespaced_key(prefix)).await
    }

    async fn size_prefix(&self, prefix: &str) -> Result<usize> {
        self.inner.size_prefix(&self.namespaced_key(prefix)).await
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}

impl fmt::Debug for NamespacedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespacedCache")
            .field("namespace", &self.namespace)
            .field("inner", &self.inner)
            .finish()
    }
}

/// Serde-typed access to a cache provider
#[derive(Clone, Debug)]
pub struct TypedCache {
    provider: Arc<dyn CacheProvider>,
}

impl TypedCache {
    /// Typed view over `provider`
    pub fn new(provider: Arc<dyn CacheProvider>) -> Self {
        Self { provider }
    }

    /// Get a typed value
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.provider.get_json(key).await? {
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
                Error::cache_with_source(format!("Failed to deserialize cached value '{key}'"), e)
            }),
            None => Ok(None),
        }
    }

    /// Store a typed value
    pub async fn set<T>(&self, key: &str, value: &T, config: CacheEntryConfig) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let json = serde_json::to_string(value).map_err(|e| {
            Error::cache_with_source(format!("Failed to serialize value for '{key}'"), e)
        })?;
        self.provider.set_json(key, &json, config).await
    }

    /// Delete a value
    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.provider.delete(key).await
    }
}
