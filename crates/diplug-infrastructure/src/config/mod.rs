//! Plugin configuration
//!
//! [`PluginConfig`] is read from `config.toml` in the runtime directory,
//! with `DIPLUG__` environment overrides on top.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{LoggingConfig, PluginConfig};
