//! Plugin installer
//!
//! Installing scaffolds the runtime configuration directory from the
//! distribution templates. Everything is first assembled in a sibling
//! staging directory, which is then renamed into place, so the runtime
//! directory is either absent or complete.

use crate::constants::STAGING_DIR_PREFIX;
use crate::paths::PathResolver;
use crate::utils::FileUtils;
use diplug_domain::error::{Error, Result};
use diplug_domain::value_objects::{DistTemplate, FileRole};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Installs and removes the runtime configuration directory
#[derive(Debug, Clone)]
pub struct Installer {
    resolver: PathResolver,
}

impl Installer {
    /// Installer for the layout behind `resolver`
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Path resolver in use
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Whether the runtime configuration directory exists
    pub fn is_installed(&self) -> bool {
        self.resolver.config_dir().exists()
    }

    /// Scaffold the runtime configuration directory
    ///
    /// Does nothing when already installed. On failure the staging
    /// directory is removed and the runtime directory is left absent.
    pub async fn install(&self) -> Result<bool> {
        let target = self.resolver.config_dir();
        if self.is_installed() {
            info!(path = %target.display(), "Already installed");
            return Ok(true);
        }

        let parent = target.parent().ok_or_else(|| {
            Error::installation(format!("{} has no parent directory", target.display()))
        })?;
        FileUtils::create_dir(parent, "plugins directory").await?;

        let staging = parent.join(format!("{STAGING_DIR_PREFIX}{}", Uuid::new_v4()));
        debug!(staging = %staging.display(), "Staging installation");

        let result = match self.populate(&staging).await {
            Ok(()) => FileUtils::rename(&staging, &target, "configuration directory").await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            if let Err(cleanup) = FileUtils::remove_dir_if_exists(&staging).await {
                warn!(
                    staging = %staging.display(),
                    error = %cleanup,
                    "Failed to remove staging directory"
                );
            }
            return Err(e);
        }

        info!(path = %target.display(), "Installed");
        Ok(true)
    }

    async fn populate(&self, staging: &Path) -> Result<()> {
        let proxy_dir = staging.join(PathResolver::file_name(FileRole::ProxyDir, None));
        FileUtils::create_dir(&proxy_dir, "proxy directory").await?;

        for template in DistTemplate::ALL {
            let from = self
                .resolver
                .resolve(FileRole::DistributionTemplate(template), None);
            let to = staging.join(PathResolver::file_name(template.installs_as(), None));
            FileUtils::copy_file(&from, &to, template_label(template)).await?;
        }
        Ok(())
    }

    /// Remove the runtime configuration directory
    ///
    /// Succeeds whether or not it existed.
    pub async fn uninstall(&self) -> Result<bool> {
        let target = self.resolver.config_dir();
        if FileUtils::remove_dir_if_exists(&target).await? {
            info!(path = %target.display(), "Uninstalled");
        } else {
            debug!(path = %target.display(), "Nothing to uninstall");
        }
        Ok(true)
    }

    /// Staging directories left behind by interrupted installs
    pub fn stale_staging_dirs(&self) -> Vec<PathBuf> {
        let Some(parent) = self.resolver.config_dir().parent().map(Path::to_path_buf) else {
            return Vec::new();
        };
        std::fs::read_dir(parent)
            .map(|entries| {
                entries
                    .filter_map(std::result::Result::ok)
                    .map(|entry| entry.path())
                    .filter(|path| {
                        path.file_name()
                            .is_some_and(|n| n.to_string_lossy().starts_with(STAGING_DIR_PREFIX))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn template_label(template: DistTemplate) -> &'static str {
    match template {
        DistTemplate::ContainerDefinitions => "container definitions",
        DistTemplate::Parameters => "parameters",
        DistTemplate::PluginConfig => "plugin configuration",
    }
}
