//! Tower middleware guarding the admin area.
//!
//! `AdminAuthLayer` and `AdminAuthService` wrap any inner service with a
//! session check. Mutating requests must also carry the session's CSRF token
//! in `X-CSRF-Token`.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::{HeaderMap, Request, StatusCode};
use tower::{Layer, Service};

use crate::csrf::{CSRF_HEADER, requires_csrf, tokens_match};
use crate::error::AuthError;
use crate::session::{SESSION_COOKIE, SessionStore};
use crate::user::AuthenticatedAdmin;

/// Tower `Layer` that wraps services with session authentication.
#[derive(Clone, Debug)]
pub struct AdminAuthLayer {
    sessions: Arc<SessionStore>,
}

impl AdminAuthLayer {
    /// Create a new auth layer over the given session store.
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }
}

impl<S> Layer<S> for AdminAuthLayer {
    type Service = AdminAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdminAuthService {
            inner,
            sessions: self.sessions.clone(),
        }
    }
}

/// Tower `Service` that validates the session before forwarding requests.
///
/// On success, inserts [`AuthenticatedAdmin`] into request extensions where
/// it's available to downstream handlers.
#[derive(Clone, Debug)]
pub struct AdminAuthService<S> {
    inner: S,
    sessions: Arc<SessionStore>,
}

impl<S> Service<Request<Body>> for AdminAuthService<S>
where
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let sessions = self.sessions.clone();

        Box::pin(async move {
            let admin = match authenticate(&sessions, &req) {
                Ok(admin) => admin,
                Err(err) => {
                    log::warn!(
                        "Rejected {} {}: {err}",
                        req.method(),
                        req.uri().path()
                    );
                    return Ok(error_response(&err));
                }
            };

            req.extensions_mut().insert(admin);
            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}

fn authenticate(
    sessions: &SessionStore,
    req: &Request<Body>,
) -> Result<AuthenticatedAdmin, AuthError> {
    let id = session_id_from_headers(req.headers()).ok_or(AuthError::MissingSession)?;
    let session = sessions.touch(id).ok_or(AuthError::InvalidSession)?;

    if requires_csrf(req.method()) {
        let provided = req
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !tokens_match(&session.csrf_token, provided) {
            return Err(AuthError::CsrfMismatch);
        }
    }
    Ok(AuthenticatedAdmin::from(session))
}

/// Value of the cookie `name` from the `Cookie` header(s).
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Session id from the `Cookie` header(s).
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, SESSION_COOKIE)
}

/// HTTP status for an auth error.
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::MissingSession | AuthError::InvalidSession | AuthError::InvalidCredentials => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::CsrfMismatch => StatusCode::FORBIDDEN,
        AuthError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
        AuthError::WeakPassword(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::Hashing(_) | AuthError::Random(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error response for an auth error.
pub fn error_response(err: &AuthError) -> axum::response::Response {
    let message = if err.is_client_error() {
        err.to_string()
    } else {
        "internal error".to_string()
    };
    let body = serde_json::json!({
        "error": {
            "category": err.category(),
            "message": message,
        }
    });

    let mut response = (
        status_for(err),
        [(http::header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response();

    if let AuthError::Throttled { retry_after_secs } = err
        && let Ok(value) = http::HeaderValue::from_str(&retry_after_secs.to_string())
    {
        response
            .headers_mut()
            .insert(http::header::RETRY_AFTER, value);
    }

    response
}
