//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error used as an optional `source`
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for diplug
///
/// Every failure during bootstrap is surfaced through this type and is
/// considered fatal by the host; nothing in the crate retries.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// A definition source is missing or malformed
    #[error("Definition error in {path}: {message}")]
    Definition {
        /// Path of the offending definition source
        path: String,
        /// Description of the problem
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// No entry is registered under the requested identifier
    #[error("Entry not found: {id}")]
    NotFound {
        /// The identifier that was looked up
        id: String,
    },

    /// Resolving an entry required itself
    #[error("Circular dependency detected: {}", path.join(" -> "))]
    CircularDependency {
        /// The resolution path, ending with the repeated identifier
        path: Vec<String>,
    },

    /// An entry exists but could not be resolved
    #[error("Failed to resolve '{id}': {message}")]
    Resolution {
        /// The identifier being resolved
        id: String,
        /// Description of the failure
        message: String,
    },

    /// A resolved entry does not have the requested type
    #[error("Entry '{id}' is not of type {expected}")]
    TypeMismatch {
        /// The identifier being resolved
        id: String,
        /// Name of the requested type
        expected: &'static str,
    },

    /// Cache backend error
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Installation or uninstallation failure
    #[error("Installation error: {message}")]
    Installation {
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// A container listener rejected the build
    #[error("Listener '{listener}' failed: {message}")]
    Listener {
        /// Name reported by the listener
        listener: String,
        /// Description of the failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Container error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a resolution error
    pub fn resolution<I: Into<String>, M: Into<String>>(id: I, message: M) -> Self {
        Self::Resolution {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a definition error without a source
    pub fn definition<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::Definition {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a definition error with source
    pub fn definition_with_source<P, M, E>(path: P, message: M, source: E) -> Self
    where
        P: Into<String>,
        M: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Definition {
            path: path.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a listener error
    pub fn listener<L: Into<String>, M: Into<String>>(listener: L, message: M) -> Self {
        Self::Listener {
            listener: listener.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Cache and installation error creation methods
impl Error {
    /// Create a cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
            source: None,
        }
    }

    /// Create a cache error with source
    pub fn cache_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Cache {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an installation error
    pub fn installation<S: Into<String>>(message: S) -> Self {
        Self::Installation {
            message: message.into(),
            source: None,
        }
    }

    /// Create an installation error with source
    pub fn installation_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Installation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
