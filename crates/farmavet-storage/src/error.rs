//! Error types for farmavet-storage

use thiserror::Error;

/// Result type alias for farmavet-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in farmavet-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from farmavet-core (validation, I/O, …)
    #[error(transparent)]
    Core(#[from] farmavet_core::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Table is not part of the content catalogue
    #[error("Unknown table: {name}")]
    UnknownTable {
        /// Table name that was requested
        name: String,
    },

    /// Column does not exist in the table, or is not writable
    #[error("Unknown column '{column}' in table {table}")]
    UnknownColumn {
        /// Table being written or filtered
        table: String,
        /// Offending column
        column: String,
    },

    /// A migration failed to apply
    #[error("Migration {version} ({name}) failed: {source}")]
    Migration {
        /// Migration version
        version: i64,
        /// Migration name
        name: String,
        /// Underlying database error
        #[source]
        source: sqlx::Error,
    },

    /// Unique constraint violated (e.g. duplicate admin username)
    #[error("{what} already exists")]
    Conflict {
        /// What already exists
        what: String,
    },
}

impl Error {
    /// Creates an unknown-table error.
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Error::UnknownTable { name: name.into() }
    }

    /// Creates an unknown-column error.
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(what: impl Into<String>) -> Self {
        Error::Conflict { what: what.into() }
    }

    /// Whether the error is a missing table/row.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::UnknownTable { .. } | Error::Core(farmavet_core::Error::NotFound { .. })
        )
    }

    /// Whether the caller's input was rejected (validation, unknown column, conflict).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnknownColumn { .. }
                | Error::Conflict { .. }
                | Error::Core(farmavet_core::Error::Validation { .. })
        )
    }
}
