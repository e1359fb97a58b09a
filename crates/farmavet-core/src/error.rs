//! Error types for farmavet-core

use std::path::{Path, PathBuf};

/// Result type alias for farmavet-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in farmavet-core and the crates built on it.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error without path context
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// File that was being read or written
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// Input validation error
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation, if any
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// A named entity could not be found
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity (table, page, admin, …)
        kind: String,
        /// Identifier that was looked up
        id: String,
    },
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new not-found error.
    pub fn not_found<K, I>(kind: K, id: I) -> Self
    where
        K: Into<String>,
        I: Into<String>,
    {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Whether this error was caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::NotFound { .. })
    }
}
