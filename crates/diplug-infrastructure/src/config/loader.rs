//! Configuration loader
//!
//! Sources are merged in this order, later ones winning:
//! 1. `PluginConfig::default()`
//! 2. `config.toml` in the runtime directory, when present
//! 3. Environment variables prefixed with `DIPLUG__`, `__` separating
//!    nested keys (`DIPLUG__CACHE__OPTIONS__HOST=redis.local`)
//!
//! A loader memoizes the first successful load for its lifetime.

use crate::config::PluginConfig;
use crate::constants::{CONFIG_CACHE_KEY, CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR};
use crate::error_ext::ErrorContext;
use crate::logging::log_config_loaded;
use crate::paths::PathResolver;
use diplug_domain::error::Result;
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider};
use diplug_domain::value_objects::FileRole;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Lowercase an environment key, restoring the camelCase top-level names
fn canonical_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    match key.as_str() {
        "usedefinitionfiles" => "useDefinitionFiles".to_string(),
        "cacheproxies" => "cacheProxies".to_string(),
        _ => key,
    }
}

/// Configuration loader service
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: PathBuf,
    env_prefix: String,
    loaded: OnceLock<PluginConfig>,
}

impl ConfigLoader {
    /// Loader reading the given configuration file
    pub fn new<P: Into<PathBuf>>(config_path: P) -> Self {
        Self {
            config_path: config_path.into(),
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
            loaded: OnceLock::new(),
        }
    }

    /// Loader reading `config.toml` from the runtime directory
    pub fn for_resolver(resolver: &PathResolver) -> Self {
        Self::new(resolver.resolve(FileRole::PluginConfig, None))
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Configuration file this loader reads
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, memoized after the first success
    pub fn load(&self) -> Result<PluginConfig> {
        if let Some(config) = self.loaded.get() {
            return Ok(config.clone());
        }
        let config = self.load_uncached()?;
        Ok(self.loaded.get_or_init(|| config).clone())
    }

    /// Load the configuration from all sources, bypassing the memo
    pub fn load_uncached(&self) -> Result<PluginConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(PluginConfig::default()));

        let found = self.config_path.is_file();
        if found {
            figment = figment.merge(Toml::file(&self.config_path));
        }
        log_config_loaded(&self.config_path, found);

        figment = figment.merge(
            Env::prefixed(&self.env_prefix)
                .split(CONFIG_ENV_SEPARATOR)
                .map(|key| canonical_key(key.as_str()).into())
                .lowercase(false),
        );

        let config: PluginConfig = figment
            .extract()
            .config_context("Failed to extract plugin configuration")?;

        if let Some(kind) = config.cache.fallback_from() {
            warn!(
                cache_type = kind,
                "Unknown cache type, falling back to the filesystem cache"
            );
        }
        debug!(
            use_definition_files = config.use_definition_files,
            cache_proxies = config.cache_proxies,
            cache = %config.cache.backend(),
            "Plugin configuration loaded"
        );

        Ok(config)
    }

    /// Load the configuration through a host cache
    ///
    /// A configuration already stored under `dp_di_config` is used as is;
    /// otherwise the configuration is loaded from its sources and stored.
    pub async fn load_cached(&self, host_cache: &dyn CacheProvider) -> Result<PluginConfig> {
        if let Some(config) = self.loaded.get() {
            return Ok(config.clone());
        }

        if let Some(json) = host_cache.get_json(CONFIG_CACHE_KEY).await? {
            match serde_json::from_str::<PluginConfig>(&json) {
                Ok(config) => {
                    debug!("Plugin configuration read from host cache");
                    return Ok(self.loaded.get_or_init(|| config).clone());
                }
                Err(e) => warn!(error = %e, "Ignoring unreadable cached plugin configuration"),
            }
        }

        let config = self.load()?;
        let json = serde_json::to_string(&config)?;
        host_cache
            .set_json(CONFIG_CACHE_KEY, &json, CacheEntryConfig::default())
            .await?;
        Ok(config)
    }
}
