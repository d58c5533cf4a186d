//! Process-shared memory cache provider
//!
//! Every handle opened for the same namespace sees the same store for the
//! rest of the process, the way an APCu segment is shared between requests
//! served by one worker.

use crate::cache::memory::MemoryCacheProvider;
use async_trait::async_trait;
use dashmap::DashMap;
use diplug_domain::error::Result;
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use std::sync::LazyLock;

static SHARED_STORES: LazyLock<DashMap<String, MemoryCacheProvider>> = LazyLock::new(DashMap::new);

/// Handle onto a process-wide memory store
#[derive(Clone, Debug)]
pub struct SharedMemoryCacheProvider {
    namespace: String,
    store: MemoryCacheProvider,
}

impl SharedMemoryCacheProvider {
    /// Open the store for `namespace`, creating it on first use
    pub fn for_namespace<S: Into<String>>(namespace: S) -> Self {
        let namespace = namespace.into();
        let store = SHARED_STORES
            .entry(namespace.clone())
            .or_default()
            .value()
            .clone();
        Self { namespace, store }
    }

    /// Namespace this handle belongs to
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl CacheProvider for SharedMemoryCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        self.store.get_json(key).await
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        self.store.set_json(key, value, config).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.store.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.store.exists(key).await
    }

    async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    async fn stats(&self) -> Result<CacheStats> {
        self.store.stats().await
    }

    async fn size(&self) -> Result<usize> {
        self.store.size().await
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        self.store.clear_prefix(prefix).await
    }

    async fn size_prefix(&self, prefix: &str) -> Result<usize> {
        self.store.size_prefix(prefix).await
    }

    fn provider_name(&self) -> &str {
        "apcu"
    }
}
