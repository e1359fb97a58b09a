//! Error types for farmavet-cli

use thiserror::Error;

/// Result type alias for farmavet-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in farmavet-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from farmavet-core
    #[error(transparent)]
    Core(#[from] farmavet_core::Error),

    /// Error from farmavet-content
    #[error(transparent)]
    Content(#[from] farmavet_content::Error),

    /// Error from farmavet-storage
    #[error(transparent)]
    Storage(#[from] farmavet_storage::Error),

    /// Error from farmavet-auth
    #[error(transparent)]
    Auth(#[from] farmavet_auth::AuthError),

    /// Error from farmavet-api
    #[error(transparent)]
    Api(#[from] farmavet_api::Error),

    /// No admin with the given username
    #[error("admin '{0}' does not exist")]
    UnknownAdmin(String),
}
