//! Cache backend selection
//!
//! Outside production every process gets its own in-memory cache, whatever
//! the configuration names, and no connection is attempted. In production
//! the configured backend is built and wrapped in a [`NamespacedCache`].
//! Connection failures are returned as they are; nothing degrades to a
//! weaker backend.

use crate::cache::provider::NamespacedCache;
use crate::paths::InstallLayout;
use diplug_domain::error::Result;
use diplug_domain::ports::cache::CacheProvider;
use diplug_domain::value_objects::{CacheBackend, CacheSettings, Environment};
use diplug_providers::cache::{
    FilesystemCacheProvider, MemcachedCacheProvider, MemoryCacheProvider, RedisCacheProvider,
    SharedMemoryCacheProvider,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Build the definition cache for `environment`
pub async fn build_cache(
    settings: &CacheSettings,
    environment: &Environment,
    layout: &InstallLayout,
) -> Result<Arc<dyn CacheProvider>> {
    if !environment.is_production() {
        debug!(
            environment = %environment,
            configured = %settings.backend(),
            "Not in production, using process-local memory cache"
        );
        return Ok(Arc::new(MemoryCacheProvider::new()));
    }

    let backend: Arc<dyn CacheProvider> = match settings.backend() {
        CacheBackend::None => Arc::new(MemoryCacheProvider::new()),
        CacheBackend::Filesystem => {
            Arc::new(FilesystemCacheProvider::new(layout.cache_dir()))
        }
        CacheBackend::Redis { host, port } => {
            Arc::new(RedisCacheProvider::connect(host, *port).await?)
        }
        CacheBackend::Memcached { host, port } => {
            Arc::new(MemcachedCacheProvider::connect(host, *port).await?)
        }
        CacheBackend::Apcu => {
            Arc::new(SharedMemoryCacheProvider::for_namespace(settings.namespace()))
        }
    };

    info!(
        backend = backend.provider_name(),
        namespace = settings.namespace(),
        "Definition cache selected"
    );
    Ok(Arc::new(NamespacedCache::new(backend, settings.namespace())))
}
