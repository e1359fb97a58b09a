//! Error types for farmavet-api

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Result type alias for farmavet-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in farmavet-api
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

    /// Upload rejected
    #[error("{0}")]
    Upload(String),

    /// Malformed request
    #[error("{0}")]
    BadRequest(String),

    /// Server I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Creates an upload rejection.
    pub fn upload(message: impl Into<String>) -> Self {
        Error::Upload(message.into())
    }

    /// Creates a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest(message.into())
    }

    /// Creates a not-found error.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Error::Core(farmavet_core::Error::not_found(kind, id.to_string()))
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Core(e) => core_status(e),
            Error::Content(farmavet_content::Error::Core(e)) => core_status(e),
            Error::Content(farmavet_content::Error::MissingColumn { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::Content(
                farmavet_content::Error::Csv(_) | farmavet_content::Error::Workbook(_),
            ) => StatusCode::BAD_REQUEST,
            Error::Storage(farmavet_storage::Error::Conflict { .. }) => StatusCode::CONFLICT,
            Error::Storage(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Error::Storage(e) if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Auth(e) => farmavet_auth::status_for(e),
            Error::Upload(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Category string used in JSON error bodies.
    pub fn category(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::UNPROCESSABLE_ENTITY => "validation",
            StatusCode::CONFLICT => "conflict",
            StatusCode::BAD_REQUEST if matches!(self, Error::Upload(_)) => "upload",
            StatusCode::BAD_REQUEST => "bad_request",
            _ => "internal",
        }
    }
}

fn core_status(err: &farmavet_core::Error) -> StatusCode {
    match err {
        farmavet_core::Error::NotFound { .. } => StatusCode::NOT_FOUND,
        farmavet_core::Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Error::Auth(err) = &self {
            return farmavet_auth::error_response(err);
        }

        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };
        let body = serde_json::json!({
            "error": {
                "category": self.category(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}
