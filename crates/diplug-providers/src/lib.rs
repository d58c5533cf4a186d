//! # diplug providers
//!
//! Implementations of the domain [`CacheProvider`](diplug_domain::CacheProvider)
//! port. The infrastructure crate's cache selector decides which one a
//! process gets.

pub mod cache;
pub mod constants;

pub use cache::{FilesystemCacheProvider, MemoryCacheProvider, SharedMemoryCacheProvider};

#[cfg(feature = "cache-memcached")]
pub use cache::MemcachedCacheProvider;
#[cfg(feature = "cache-redis")]
pub use cache::RedisCacheProvider;
