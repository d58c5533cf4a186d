//! Configuration types

use crate::constants::DEFAULT_LOG_LEVEL;
use diplug_domain::value_objects::CacheSettings;
use serde::{Deserialize, Serialize};

/// Plugin configuration
///
/// Keys are camelCase in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    /// Build the container from definition files
    pub use_definition_files: bool,

    /// Persist lazy service proxy manifests
    pub cache_proxies: bool,

    /// Definition cache backend
    pub cache: CacheSettings,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            use_definition_files: true,
            cache_proxies: true,
            cache: CacheSettings::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Logging at `level`, human readable
    pub fn with_level<S: Into<String>>(level: S) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }
}
