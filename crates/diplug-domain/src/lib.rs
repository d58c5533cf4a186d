//! # Domain Layer
//!
//! Core types shared by every diplug crate. Contains no I/O.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error enum and `Result` alias |
//! | [`constants`] | Environment variable names and fixed tags |
//! | [`ports`] | Boundary traits implemented by providers (cache backends) |
//! | [`value_objects`] | Environment, definition sources, file roles, cache settings |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use ports::{CacheEntryConfig, CacheProvider, CacheStats};
pub use value_objects::{
    CacheBackend, CacheSettings, DefinitionRole, DefinitionSource, DistTemplate, Environment,
    FileRole,
};
