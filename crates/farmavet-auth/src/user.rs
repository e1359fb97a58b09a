//! Authenticated admin identity and extraction helpers.

use axum::extract::FromRequestParts;
use axum::response::Response;
use http::request::Parts;

use crate::error::AuthError;
use crate::middleware::error_response;
use crate::session::Session;

/// The admin behind a request, inserted by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    /// Admin row id
    pub id: i64,
    /// Admin username
    pub username: String,
    /// Session id the request was made with
    pub session_id: String,
    /// CSRF token of the session
    pub csrf_token: String,
}

impl From<Session> for AuthenticatedAdmin {
    fn from(session: Session) -> Self {
        Self {
            id: session.admin_id,
            username: session.username,
            session_id: session.id,
            csrf_token: session.csrf_token,
        }
    }
}

/// Extract the `AuthenticatedAdmin` from HTTP request `Parts`, if present.
pub fn admin_from_parts(parts: &Parts) -> Option<&AuthenticatedAdmin> {
    parts.extensions.get::<AuthenticatedAdmin>()
}

/// Username for audit logs; `"anonymous"` outside the admin area.
pub fn username_from_parts(parts: &Parts) -> &str {
    admin_from_parts(parts)
        .map(|a| a.username.as_str())
        .unwrap_or("anonymous")
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedAdmin {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        admin_from_parts(parts)
            .cloned()
            .ok_or_else(|| error_response(&AuthError::MissingSession))
    }
}
