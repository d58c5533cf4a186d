//! Cache backend selection
//!
//! Configuration files describe the backend with a loose `{ type, options,
//! namespace }` shape. [`CacheSettings`] parses that shape into a
//! [`CacheBackend`] variant carrying only the fields the backend needs, so a
//! Redis backend without a host cannot exist past deserialization.

use crate::constants::DEFAULT_CACHE_NAMESPACE;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Redis port when `options.port` is omitted
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default Memcached port when `options.port` is omitted
pub const DEFAULT_MEMCACHED_PORT: u16 = 11211;

/// Cache backend for parsed definitions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// No backend configured; a process-local memory cache is used
    #[default]
    None,
    /// Files under the fixed cache directory
    Filesystem,
    /// Redis server
    Redis {
        /// Server host name
        host: String,
        /// Server port
        port: u16,
    },
    /// Memcached server
    Memcached {
        /// Server host name
        host: String,
        /// Server port
        port: u16,
    },
    /// Process-shared memory store
    Apcu,
}

impl CacheBackend {
    /// Name used in configuration files
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Filesystem => "filesystem",
            Self::Redis { .. } => "redis",
            Self::Memcached { .. } => "memcached",
            Self::Apcu => "apcu",
        }
    }

    /// `host:port` for network backends
    pub fn address(&self) -> Option<String> {
        match self {
            Self::Redis { host, port } | Self::Memcached { host, port } => {
                Some(format!("{host}:{port}"))
            }
            _ => None,
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address() {
            Some(address) => write!(f, "{}({address})", self.type_name()),
            None => f.write_str(self.type_name()),
        }
    }
}

/// Connection options as written in configuration files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCacheOptions {
    /// Server host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Server port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Cache section exactly as written in configuration files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCacheSettings {
    /// Backend type name (`redis`, `memcached`, `apcu`, `filesystem`, `none`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Backend connection options
    #[serde(default)]
    pub options: RawCacheOptions,
    /// Key prefix
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    DEFAULT_CACHE_NAMESPACE.to_string()
}

impl Default for RawCacheSettings {
    fn default() -> Self {
        Self {
            kind: None,
            options: RawCacheOptions::default(),
            namespace: default_namespace(),
        }
    }
}

/// Validated cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCacheSettings", into = "RawCacheSettings")]
pub struct CacheSettings {
    backend: CacheBackend,
    namespace: String,
    fallback_from: Option<String>,
}

impl CacheSettings {
    /// Settings for the given backend and namespace
    pub fn new<S: Into<String>>(backend: CacheBackend, namespace: S) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
            fallback_from: None,
        }
    }

    /// Selected backend
    pub fn backend(&self) -> &CacheBackend {
        &self.backend
    }

    /// Key namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Unrecognised type name that was mapped to the filesystem backend
    pub fn fallback_from(&self) -> Option<&str> {
        self.fallback_from.as_deref()
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::new(CacheBackend::None, DEFAULT_CACHE_NAMESPACE)
    }
}

fn required_host(kind: &str, options: &RawCacheOptions) -> Result<String, Error> {
    options
        .host
        .clone()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::configuration(format!("cache.options.host is required for '{kind}'")))
}

impl TryFrom<RawCacheSettings> for CacheSettings {
    type Error = Error;

    fn try_from(raw: RawCacheSettings) -> Result<Self, Self::Error> {
        let kind = raw
            .kind
            .as_deref()
            .map(|k| k.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let mut fallback_from = None;
        let backend = match kind.as_str() {
            "" | "none" => CacheBackend::None,
            "filesystem" => CacheBackend::Filesystem,
            "redis" => CacheBackend::Redis {
                host: required_host(&kind, &raw.options)?,
                port: raw.options.port.unwrap_or(DEFAULT_REDIS_PORT),
            },
            "memcached" => CacheBackend::Memcached {
                host: required_host(&kind, &raw.options)?,
                port: raw.options.port.unwrap_or(DEFAULT_MEMCACHED_PORT),
            },
            "apcu" => CacheBackend::Apcu,
            _ => {
                fallback_from = raw.kind.clone();
                CacheBackend::Filesystem
            }
        };

        Ok(Self {
            backend,
            namespace: raw.namespace,
            fallback_from,
        })
    }
}

impl From<CacheSettings> for RawCacheSettings {
    fn from(settings: CacheSettings) -> Self {
        let kind = settings
            .fallback_from
            .unwrap_or_else(|| settings.backend.type_name().to_string());
        let options = match settings.backend {
            CacheBackend::Redis { host, port } | CacheBackend::Memcached { host, port } => {
                RawCacheOptions {
                    host: Some(host),
                    port: Some(port),
                }
            }
            _ => RawCacheOptions::default(),
        };
        Self {
            kind: Some(kind),
            options,
            namespace: settings.namespace,
        }
    }
}
