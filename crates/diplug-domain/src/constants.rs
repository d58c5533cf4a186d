//! Domain constants

/// Primary environment variable selecting the deployment environment tag
pub const ENVIRONMENT_VAR: &str = "DIPLUG_ENVIRONMENT";

/// Fallback variable, set by web servers that rewrite requests internally
pub const ENVIRONMENT_FALLBACK_VAR: &str = "REDIRECT_DIPLUG_ENVIRONMENT";

/// Environment tag that enables persistent definition caching
pub const PRODUCTION_TAG: &str = "production";

/// Default namespace applied to cache keys
pub const DEFAULT_CACHE_NAMESPACE: &str = "diplug";

/// Separator between a cache namespace and the key
pub const CACHE_NAMESPACE_SEPARATOR: &str = ":";
