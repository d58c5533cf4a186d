//! Deployment environment

use crate::constants::{ENVIRONMENT_FALLBACK_VAR, ENVIRONMENT_VAR, PRODUCTION_TAG};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment environment tag (e.g. `production`, `staging`)
///
/// Selects the environment-specific definitions overlay and gates
/// persistent caching. An empty tag is treated as no tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    tag: Option<String>,
}

impl Environment {
    /// Create an environment from an optional tag
    pub fn new<S: Into<String>>(tag: Option<S>) -> Self {
        let tag = tag.map(Into::into).filter(|t| !t.is_empty());
        Self { tag }
    }

    /// Environment with the given tag
    pub fn tagged<S: Into<String>>(tag: S) -> Self {
        Self::new(Some(tag))
    }

    /// Environment without a tag
    pub fn untagged() -> Self {
        Self { tag: None }
    }

    /// Read the tag from `DIPLUG_ENVIRONMENT`, falling back to
    /// `REDIRECT_DIPLUG_ENVIRONMENT`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the tag through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let primary = lookup(ENVIRONMENT_VAR).filter(|v| !v.is_empty());
        let tag = primary.or_else(|| lookup(ENVIRONMENT_FALLBACK_VAR));
        Self::new(tag)
    }

    /// The tag, if any
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Whether this is the production environment
    pub fn is_production(&self) -> bool {
        self.tag() == Some(PRODUCTION_TAG)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("<none>"))
    }
}
