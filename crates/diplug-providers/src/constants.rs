//! Provider constants

/// Default capacity of in-memory caches, in entries
pub const MEMORY_CACHE_DEFAULT_CAPACITY: u64 = 10_000;

/// File extension of filesystem cache entries
pub const FILESYSTEM_CACHE_EXTENSION: &str = "diplug-cache";
