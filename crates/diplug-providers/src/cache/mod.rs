//! Cache Provider Implementations
//!
//! ## Available Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`MemoryCacheProvider`] | Local | Per-handle moka cache, gone with the process |
//! | [`SharedMemoryCacheProvider`] | Local | Process-wide store keyed by namespace |
//! | [`FilesystemCacheProvider`] | Persistent | One file per key under a root directory |
//! | [`RedisCacheProvider`] | Distributed | Redis, connected at construction |
//! | [`MemcachedCacheProvider`] | Distributed | Memcached ASCII protocol, connected at construction |

pub mod filesystem;
#[cfg(feature = "cache-memcached")]
pub mod memcached;
pub mod memory;
#[cfg(feature = "cache-redis")]
pub mod redis;
pub mod shared;

pub use filesystem::FilesystemCacheProvider;
#[cfg(feature = "cache-memcached")]
pub use memcached::MemcachedCacheProvider;
pub use memory::MemoryCacheProvider;
#[cfg(feature = "cache-redis")]
pub use redis::RedisCacheProvider;
pub use shared::SharedMemoryCacheProvider;

// Re-export domain types used by cache providers
pub use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider, CacheStats};
