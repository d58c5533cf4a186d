//! Filesystem layout
//!
//! Two areas matter: a runtime-writable area,
//! `<var_dir>/plugins/dependency-injection/`, holding the live configuration
//! and definitions; and a read-only distribution area holding the templates
//! the installer copies from. [`PathResolver`] maps a [`FileRole`] and an
//! optional environment tag to a path in one of them without touching the
//! filesystem.

use crate::constants::{
    APP_DIR_NAME, CACHE_DIR_ENV, CONFIG_FILENAME, DEFINITION_FILE_EXTENSION, DIST_DIR_ENV,
    DIST_TEMPLATE_SUFFIX, PLUGIN_DIR_NAME, PLUGINS_DIR_NAME, PROXY_DIR_NAME, VAR_DIR_ENV,
};
use diplug_domain::value_objects::{DefinitionRole, DefinitionSource, FileRole};
use std::path::{Path, PathBuf};

/// Root directories of an installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    var_dir: PathBuf,
    dist_dir: PathBuf,
    cache_dir: PathBuf,
}

impl InstallLayout {
    /// Layout with explicit roots
    pub fn new<V, D, C>(var_dir: V, dist_dir: D, cache_dir: C) -> Self
    where
        V: Into<PathBuf>,
        D: Into<PathBuf>,
        C: Into<PathBuf>,
    {
        Self {
            var_dir: var_dir.into(),
            dist_dir: dist_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Layout from `DIPLUG_VAR_DIR`, `DIPLUG_DIST_DIR` and `DIPLUG_CACHE_DIR`,
    /// falling back to platform defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Layout from an arbitrary variable lookup
    ///
    /// Defaults: the var dir is `diplug` under the platform data dir, the
    /// distribution dir is `dist` under the working directory and the cache
    /// dir is `diplug` under the platform cache dir (or `cache` under the var
    /// dir when the platform has none).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty()).map(PathBuf::from);

        let var_dir = var(VAR_DIR_ENV).unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from("var"))
        });
        let dist_dir = var(DIST_DIR_ENV).unwrap_or_else(|| {
            std::env::current_dir()
                .map(|d| d.join(DIST_TEMPLATE_SUFFIX))
                .unwrap_or_else(|_| PathBuf::from(DIST_TEMPLATE_SUFFIX))
        });
        let cache_dir = var(CACHE_DIR_ENV).unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| var_dir.join("cache"))
        });

        Self {
            var_dir,
            dist_dir,
            cache_dir,
        }
    }

    /// Replace the var dir
    pub fn with_var_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.var_dir = dir.into();
        self
    }

    /// Replace the distribution dir
    pub fn with_dist_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dist_dir = dir.into();
        self
    }

    /// Replace the cache dir
    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Writable data root
    pub fn var_dir(&self) -> &Path {
        &self.var_dir
    }

    /// Read-only distribution root
    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    /// Root of the filesystem cache backend
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

/// Maps logical file roles to absolute paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    layout: InstallLayout,
}

impl PathResolver {
    /// Resolver over `layout`
    pub fn new(layout: InstallLayout) -> Self {
        Self { layout }
    }

    /// Underlying layout
    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Runtime configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.layout
            .var_dir
            .join(PLUGINS_DIR_NAME)
            .join(PLUGIN_DIR_NAME)
    }

    /// Root of the filesystem cache backend
    pub fn cache_dir(&self) -> &Path {
        &self.layout.cache_dir
    }

    /// Absolute path of `role`
    ///
    /// The environment tag only applies to definition roles; an empty tag is
    /// the same as none.
    pub fn resolve(&self, role: FileRole, environment: Option<&str>) -> PathBuf {
        match role {
            FileRole::DistributionTemplate(_) => {
                self.layout.dist_dir.join(Self::file_name(role, None))
            }
            _ => self.config_dir().join(Self::file_name(role, environment)),
        }
    }

    /// File name of a runtime role, relative to the configuration directory
    pub fn file_name(role: FileRole, environment: Option<&str>) -> String {
        match role {
            FileRole::ContainerDefinitions | FileRole::Parameters => {
                let stem = role
                    .definition_role()
                    .map(DefinitionRole::file_stem)
                    .unwrap_or_default();
                match environment.filter(|tag| !tag.is_empty()) {
                    Some(tag) => format!("{tag}.{stem}.{DEFINITION_FILE_EXTENSION}"),
                    None => format!("{stem}.{DEFINITION_FILE_EXTENSION}"),
                }
            }
            FileRole::PluginConfig => CONFIG_FILENAME.to_string(),
            FileRole::ProxyDir => PROXY_DIR_NAME.to_string(),
            FileRole::DistributionTemplate(template) => format!(
                "{}.{DIST_TEMPLATE_SUFFIX}",
                Self::file_name(template.installs_as(), None)
            ),
        }
    }

    /// Definition source for `role`, specific to `environment` when given
    pub fn definition_source(
        &self,
        role: DefinitionRole,
        environment: Option<&str>,
    ) -> DefinitionSource {
        DefinitionSource::new(
            role,
            environment,
            self.resolve(FileRole::from(role), environment),
        )
    }
}
