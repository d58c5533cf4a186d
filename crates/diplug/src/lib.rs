//! # diplug
//!
//! Configuration-driven service container for a host application.
//!
//! The host hands diplug an installation layout; diplug finds the
//! definition files, picks a definition cache for the environment, builds
//! the container once and returns a handle the host keeps for the rest of
//! the process.
//!
//! ## Example
//!
//! ```ignore
//! use diplug::{BootstrapOptions, DiPlugin, LifecycleHooks};
//!
//! let plugin = DiPlugin::new(
//!     BootstrapOptions::from_env().with_factory("clock", |_| Ok(std::time::Instant::now())),
//! );
//! let handle = plugin.on_startup().await?;
//! let name: String = handle.parameter("app.name")?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - errors, the cache port and value objects
//! - `providers` - cache backends
//! - `infrastructure` - paths, container engine, bootstrap, installer
//! - `cli` - the `diplug` command

pub mod cli;

/// Domain layer - errors, ports and value objects
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use diplug_domain::*;
}

/// Cache backends
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use diplug_providers::*;
}

/// Infrastructure layer - container engine, bootstrap, installer
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use diplug_infrastructure::*;
}

// Re-export commonly used types at the crate root
pub use domain::{Environment, Error, Result};
pub use infrastructure::di::{
    Container, ContainerBuilder, Definition, FactoryArgs, Injectable, LazyService,
};
pub use infrastructure::{
    Bootstrap, BootstrapOptions, ContainerHandle, ContainerListener, ControllerHelper, DiPlugin,
    InstallLayout, Installer, LifecycleHooks, PathResolver,
};
