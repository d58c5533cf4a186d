//! Domain Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`Environment`] | Deployment environment tag read from the process environment |
//! | [`DefinitionSource`] | A resolved definition file feeding the container builder |
//! | [`FileRole`] | Logical file kinds the path resolver knows about |
//! | [`CacheSettings`] | Cache backend selection plus key namespace |

/// Cache backend selection
pub mod cache;
/// Definition sources and roles
pub mod definition;
/// Deployment environment
pub mod environment;
/// Logical file roles
pub mod file_role;

pub use cache::{CacheBackend, CacheSettings};
pub use definition::{DefinitionRole, DefinitionSource};
pub use environment::Environment;
pub use file_role::{DistTemplate, FileRole};
