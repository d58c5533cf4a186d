//! Infrastructure constants
//!
//! File names, directory names and environment variables shared by the path
//! resolver, the installer, the configuration loader and the CLI.

// ============================================================================
// Filesystem layout
// ============================================================================

/// Directory under the var dir holding plugin runtime directories
pub const PLUGINS_DIR_NAME: &str = "plugins";

/// Name of the runtime configuration directory
pub const PLUGIN_DIR_NAME: &str = "dependency-injection";

/// Extension of definition files
pub const DEFINITION_FILE_EXTENSION: &str = "toml";

/// Plugin configuration file name
pub const CONFIG_FILENAME: &str = "config.toml";

/// Proxy manifest directory name
pub const PROXY_DIR_NAME: &str = "generated";

/// Suffix of distribution templates
pub const DIST_TEMPLATE_SUFFIX: &str = "dist";

/// Prefix of installer staging directories, completed by a UUID
pub const STAGING_DIR_PREFIX: &str = ".dependency-injection.staging-";

/// Application directory name under the platform data and cache dirs
pub const APP_DIR_NAME: &str = "diplug";

// ============================================================================
// Environment variables
// ============================================================================

/// Overrides the var dir
pub const VAR_DIR_ENV: &str = "DIPLUG_VAR_DIR";

/// Overrides the distribution dir
pub const DIST_DIR_ENV: &str = "DIPLUG_DIST_DIR";

/// Overrides the cache dir
pub const CACHE_DIR_ENV: &str = "DIPLUG_CACHE_DIR";

/// Log filter directive
pub const LOG_FILTER_ENV: &str = "DIPLUG_LOG";

/// Prefix of configuration overrides (`DIPLUG__CACHE__TYPE=redis`)
pub const CONFIG_ENV_PREFIX: &str = "DIPLUG__";

/// Nesting separator in configuration override variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// Cache keys
// ============================================================================

/// Host cache key under which the plugin configuration is stored
pub const CONFIG_CACHE_KEY: &str = "dp_di_config";

/// Prefix of definition cache keys, followed by the source path
pub const DEFINITIONS_CACHE_PREFIX: &str = "definitions:";

// ============================================================================
// Container
// ============================================================================

/// Suffix of proxy manifest files
pub const PROXY_MANIFEST_SUFFIX: &str = ".proxy.json";

/// Deepest resolution chain before giving up
pub const MAX_RESOLUTION_DEPTH: usize = 256;

// ============================================================================
// Logging
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
