//! Host lifecycle integration
//!
//! The host calls [`LifecycleHooks::on_startup`] when it starts serving and
//! [`LifecycleHooks::on_console_startup`] when it runs a console command.
//! Whichever comes first builds the container; the other gets the same
//! handle.

pub mod controller;

pub use controller::ControllerHelper;

use crate::di::bootstrap::{Bootstrap, BootstrapOptions, ContainerListener};
use crate::di::handle::ContainerHandle;
use crate::installer::Installer;
use crate::paths::PathResolver;
use async_trait::async_trait;
use diplug_domain::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Startup signals sent by the host
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    /// Application startup
    async fn on_startup(&self) -> Result<Arc<ContainerHandle>>;

    /// Console startup
    async fn on_console_startup(&self) -> Result<Arc<ContainerHandle>>;
}

/// The dependency injection plugin as seen by the host
#[derive(Debug)]
pub struct DiPlugin {
    bootstrap: Bootstrap,
    installer: Installer,
}

impl DiPlugin {
    /// Plugin bootstrapping with `options`
    pub fn new(options: BootstrapOptions) -> Self {
        let installer = Installer::new(PathResolver::new(options.layout().clone()));
        Self {
            bootstrap: Bootstrap::new(options),
            installer,
        }
    }

    /// Register a container listener
    ///
    /// Listeners added after the container was built never run.
    pub fn add_listener(&mut self, listener: Arc<dyn ContainerListener>) -> &mut Self {
        self.bootstrap.add_listener(listener);
        self
    }

    /// Handle, once either startup hook has built it
    pub fn container(&self) -> Option<Arc<ContainerHandle>> {
        self.bootstrap.handle()
    }

    /// Installer for this plugin's layout
    pub fn installer(&self) -> &Installer {
        &self.installer
    }

    /// Whether the runtime configuration directory exists
    pub fn is_installed(&self) -> bool {
        self.installer.is_installed()
    }

    /// Scaffold the runtime configuration directory
    pub async fn install(&self) -> Result<bool> {
        self.installer.install().await
    }

    /// Remove the runtime configuration directory
    pub async fn uninstall(&self) -> Result<bool> {
        self.installer.uninstall().await
    }
}

#[async_trait]
impl LifecycleHooks for DiPlugin {
    async fn on_startup(&self) -> Result<Arc<ContainerHandle>> {
        debug!("Startup signal received");
        self.bootstrap.bootstrap().await
    }

    async fn on_console_startup(&self) -> Result<Arc<ContainerHandle>> {
        debug!("Console startup signal received");
        self.bootstrap.bootstrap().await
    }
}
