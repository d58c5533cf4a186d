//! Command line interface
//!
//! The `check` command goes through the console startup hook, the same path
//! a host takes when it runs a console command.

use clap::{Parser, Subcommand};
use diplug_domain::error::Result;
use diplug_domain::value_objects::Environment;
use diplug_infrastructure::config::{ConfigLoader, LoggingConfig};
use diplug_infrastructure::constants::DEFAULT_LOG_LEVEL;
use diplug_infrastructure::di::BootstrapOptions;
use diplug_infrastructure::lifecycle::{DiPlugin, LifecycleHooks};
use diplug_infrastructure::paths::{InstallLayout, PathResolver};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

/// Command line interface for diplug
#[derive(Parser, Debug)]
#[command(name = "diplug")]
#[command(about = "Configuration-driven service container bootstrap")]
#[command(version)]
pub struct Cli {
    /// Writable data root (default: DIPLUG_VAR_DIR or the platform data dir)
    #[arg(long, global = true)]
    pub var_dir: Option<PathBuf>,

    /// Directory holding the .dist templates (default: DIPLUG_DIST_DIR or ./dist)
    #[arg(long, global = true)]
    pub dist_dir: Option<PathBuf>,

    /// Root of the filesystem cache backend (default: DIPLUG_CACHE_DIR or the platform cache dir)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scaffold the runtime configuration directory from the templates
    Install,
    /// Remove the runtime configuration directory
    Uninstall,
    /// Show layout, environment and installation state
    Status,
    /// Build the container and resolve the given entries
    Check {
        /// Entry to resolve (repeatable)
        #[arg(long = "service", value_name = "ID")]
        services: Vec<String>,
    },
}

impl Cli {
    /// Logging configuration from the global flags
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            json_format: self.json_logs,
        }
    }

    /// Layout from the environment with the flags applied on top
    pub fn layout(&self) -> InstallLayout {
        let mut layout = InstallLayout::from_env();
        if let Some(dir) = &self.var_dir {
            layout = layout.with_var_dir(dir);
        }
        if let Some(dir) = &self.dist_dir {
            layout = layout.with_dist_dir(dir);
        }
        if let Some(dir) = &self.cache_dir {
            layout = layout.with_cache_dir(dir);
        }
        layout
    }

    /// Run the command and return the report to print
    pub async fn execute(&self) -> Result<String> {
        let layout = self.layout();
        let environment = Environment::from_env();
        let plugin = DiPlugin::new(BootstrapOptions::new(layout.clone(), environment.clone()));

        match &self.command {
            Command::Install => {
                let was_installed = plugin.is_installed();
                plugin.install().await?;
                let dir = plugin.installer().resolver().config_dir();
                Ok(if was_installed {
                    format!("Already installed at {}", dir.display())
                } else {
                    format!("Installed at {}", dir.display())
                })
            }
            Command::Uninstall => {
                let dir = plugin.installer().resolver().config_dir();
                plugin.uninstall().await?;
                Ok(format!("Removed {}", dir.display()))
            }
            Command::Status => status_report(&plugin, &layout, &environment),
            Command::Check { services } => {
                let handle = plugin.on_console_startup().await?;
                let mut report = format!(
                    "Container ready: {} entries",
                    handle.container().len()
                );
                for id in services {
                    handle.get(id)?;
                    info!(id = %id, "Entry resolved");
                    let _ = write!(report, "\n  {id}: ok");
                }
                Ok(report)
            }
        }
    }
}

fn status_report(plugin: &DiPlugin, layout: &InstallLayout, environment: &Environment) -> Result<String> {
    let resolver = PathResolver::new(layout.clone());
    let mut report = String::new();
    let _ = writeln!(report, "environment:  {environment}");
    let _ = writeln!(report, "production:   {}", environment.is_production());
    let _ = writeln!(report, "config dir:   {}", resolver.config_dir().display());
    let _ = writeln!(report, "dist dir:     {}", layout.dist_dir().display());
    let _ = writeln!(report, "cache dir:    {}", layout.cache_dir().display());
    let _ = write!(report, "installed:    {}", plugin.is_installed());

    if plugin.is_installed() {
        let config = ConfigLoader::for_resolver(&resolver).load()?;
        let _ = write!(
            report,
            "\ndefinitions:  {}\nproxies:      {}\ncache:        {}",
            config.use_definition_files,
            config.cache_proxies,
            config.cache.backend()
        );
    }

    for stale in plugin.installer().stale_staging_dirs() {
        let _ = write!(report, "\nstale staging directory: {}", stale.display());
    }
    Ok(report)
}
