//! Auth-specific error types.

/// Result type alias for farmavet-auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No session cookie present.
    #[error("authentication required")]
    MissingSession,

    /// Session id unknown or expired.
    #[error("session expired or invalid")]
    InvalidSession,

    /// Mutating request without a matching CSRF token.
    #[error("invalid CSRF token")]
    CsrfMismatch,

    /// Username unknown or password wrong.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Too many failed logins from this client.
    #[error("too many failed attempts, retry in {retry_after_secs} seconds")]
    Throttled {
        /// Seconds until the lockout ends
        retry_after_secs: u64,
    },

    /// Password rejected by the strength rules.
    #[error("{0}")]
    WeakPassword(&'static str),

    /// Hashing backend failure.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// OS random source unavailable.
    #[error("random source failed: {0}")]
    Random(String),
}

impl AuthError {
    /// Whether this error is caused by the client (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::Hashing(_) | AuthError::Random(_))
    }

    /// Category string used in JSON error bodies.
    pub fn category(&self) -> &'static str {
        match self {
            AuthError::MissingSession | AuthError::InvalidSession => "authentication",
            AuthError::CsrfMismatch => "csrf",
            AuthError::InvalidCredentials => "authentication",
            AuthError::Throttled { .. } => "throttled",
            AuthError::WeakPassword(_) => "validation",
            AuthError::Hashing(_) | AuthError::Random(_) => "internal",
        }
    }
}
