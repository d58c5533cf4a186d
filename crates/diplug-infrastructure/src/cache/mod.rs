//! Cache wiring
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`provider`] | Namespaced and typed views over a cache provider |
//! | [`selector`] | Picks the backend for the current environment |

pub mod provider;
pub mod selector;

pub use provider::{NamespacedCache, TypedCache};
pub use selector::build_cache;
