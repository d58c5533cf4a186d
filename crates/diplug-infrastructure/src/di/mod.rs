//! Container engine and bootstrap
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`definitions`] | Definition file format |
//! | [`aggregator`] | Ordering of definition sources |
//! | [`builder`] | Container builder, definition cache, proxy manifests |
//! | [`container`] | Resolution, singletons, injection |
//! | [`proxy`] | Lazy services and their manifests |
//! | [`bootstrap`] | One-shot build orchestration and listeners |
//! | [`handle`] | Handle returned to the host |

pub mod aggregator;
pub mod bootstrap;
pub mod builder;
pub mod container;
pub mod definitions;
pub mod handle;
pub mod proxy;

pub use bootstrap::{Bootstrap, BootstrapOptions, ContainerListener};
pub use builder::ContainerBuilder;
pub use container::{
    Container, FactoryArgs, FactoryFn, Injectable, ResolutionContext, ServiceRef,
};
pub use definitions::{Definition, DefinitionMap, FactoryDefinition};
pub use handle::ContainerHandle;
pub use proxy::{LazyService, ProxyManifest};
