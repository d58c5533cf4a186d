//! # Infrastructure Layer
//!
//! Everything with I/O: locating files, choosing cache backends, building
//! the container and scaffolding the installation.
//!
//! ### Configuration & Layout
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Plugin configuration via figment |
//! | [`paths`] | Installation layout and path resolution |
//! | [`constants`] | File names and environment variables |
//!
//! ### Container
//! | Module | Description |
//! |--------|-------------|
//! | [`di`] | Definition files, container engine, bootstrap |
//! | [`lifecycle`] | Host startup hooks and controller helper |
//! | [`cache`] | Definition cache selection |
//!
//! ### Operations
//! | Module | Description |
//! |--------|-------------|
//! | [`installer`] | Transactional install and uninstall |
//! | [`logging`] | Structured logging with tracing |

pub mod cache;
pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod installer;
pub mod lifecycle;
pub mod logging;
pub mod paths;
pub mod utils;

pub use di::{Bootstrap, BootstrapOptions, ContainerHandle, ContainerListener};
pub use error_ext::ErrorContext;
pub use installer::Installer;
pub use lifecycle::{ControllerHelper, DiPlugin, LifecycleHooks};
pub use paths::{InstallLayout, PathResolver};
