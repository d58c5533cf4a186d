//! Definition sources

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of definitions a file contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionRole {
    /// Service and value definitions
    Container,
    /// Local parameters, applied last
    Parameters,
}

impl DefinitionRole {
    /// File stem used for this role
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Parameters => "parameters",
        }
    }
}

impl fmt::Display for DefinitionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// A file contributing definitions to the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionSource {
    role: DefinitionRole,
    environment: Option<String>,
    path: PathBuf,
}

impl DefinitionSource {
    /// Create a source
    pub fn new<P: Into<PathBuf>>(role: DefinitionRole, environment: Option<&str>, path: P) -> Self {
        Self {
            role,
            environment: environment.filter(|e| !e.is_empty()).map(str::to_owned),
            path: path.into(),
        }
    }

    /// Role of this source
    pub fn role(&self) -> DefinitionRole {
        self.role
    }

    /// Environment tag this source is specific to
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Filesystem path of this source
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this source is an environment overlay
    pub fn is_overlay(&self) -> bool {
        self.environment.is_some()
    }
}

impl fmt::Display for DefinitionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
