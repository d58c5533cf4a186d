//! Domain Port Interfaces
//!
//! Boundary contracts implemented outside the domain. The container bootstrap
//! only ever talks to a cache through [`CacheProvider`], so backends can be
//! swapped without touching bootstrap logic.

/// Cache backend port
pub mod cache;

pub use cache::{CacheEntryConfig, CacheProvider, CacheStats};
