//! Login, logout and password management.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use farmavet_auth::{
    AuthError, AuthenticatedAdmin, Session, check_password_strength, hash_password,
    session_id_from_headers, verify_login, verify_password,
};
use tokio::task::spawn_blocking;
use http::HeaderMap;
use http::header::SET_COOKIE;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::extract::{ClientAddr, expired_session_cookie, session_cookie};
use crate::state::AppState;

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin username
    pub username: String,
    /// Plain-text password
    pub password: String,
}

/// Session details returned to the admin client.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    /// Admin username
    pub username: String,
    /// Token to echo in `X-CSRF-Token` on mutating requests
    pub csrf_token: String,
}

/// `POST /login`
///
/// An attempt is reserved on the throttle before the password is checked and
/// settled once the outcome is known.
pub async fn login(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    let ticket = state.throttle.try_acquire(&client).map_err(|remaining| {
        tracing::warn!(client = %client, "login throttled");
        AuthError::Throttled {
            retry_after_secs: remaining.as_secs().max(1),
        }
    })?;

    let username = request.username.trim();
    let admin = state.db.find_admin_by_username(username).await?;
    let stored = admin.as_ref().map(|a| a.password_hash.clone());
    let password = request.password;
    let verified = spawn_blocking(move || verify_login(&password, stored.as_deref())).await?;

    let admin = match admin {
        Some(admin) if verified => admin,
        _ => {
            let failures = ticket.fail();
            tracing::warn!(client = %client, username, failures, "failed login");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    ticket.succeed();
    let session = state.sessions.create(admin.id, &admin.username)?;
    tracing::info!(username = %admin.username, "admin logged in");

    Ok(session_response(&state, session))
}

/// `POST /logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id_from_headers(&headers)
        && state.sessions.remove(id)
    {
        tracing::info!("admin logged out");
    }
    (
        [(SET_COOKIE, expired_session_cookie())],
        Json(serde_json::json!({ "logged_out": true })),
    )
        .into_response()
}

/// `GET /admin/session`
pub async fn session(admin: AuthenticatedAdmin) -> Json<SessionInfo> {
    Json(SessionInfo {
        username: admin.username,
        csrf_token: admin.csrf_token,
    })
}

/// Body of `POST /admin/password`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    /// Password in use
    pub current_password: String,
    /// Replacement
    pub new_password: String,
    /// Replacement, repeated
    pub confirm_password: String,
}

/// `POST /admin/password`
///
/// Every session of the admin is closed once the password changes; the
/// caller gets a fresh session cookie and CSRF token.
pub async fn change_password(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Response> {
    if request.current_password.is_empty()
        || request.new_password.is_empty()
        || request.confirm_password.is_empty()
    {
        return Err(validation("Todos los campos son requeridos"));
    }
    if request.new_password != request.confirm_password {
        return Err(validation("Las nuevas contraseñas no coinciden"));
    }
    check_password_strength(&request.new_password)?;

    let account = state
        .db
        .find_admin(admin.id)
        .await?
        .ok_or_else(|| Error::not_found("admin", admin.id))?;
    let ChangePasswordRequest {
        current_password,
        new_password,
        ..
    } = request;
    let hash = spawn_blocking(move || {
        verify_password(&current_password, &account.password_hash)
            .then(|| hash_password(&new_password))
    })
    .await?;
    let Some(hash) = hash else {
        tracing::warn!(username = %admin.username, "password change with wrong current password");
        return Err(validation("La contraseña actual es incorrecta"));
    };
    let hash = hash?;
    state.db.update_admin_password(admin.id, &hash).await?;
    let closed = state.sessions.remove_admin(admin.id);
    let session = state.sessions.create(admin.id, &admin.username)?;
    tracing::info!(username = %admin.username, closed, "admin password changed");

    Ok(session_response(&state, session))
}

fn session_response(state: &AppState, session: Session) -> Response {
    let cookie = session_cookie(
        &session.id,
        state.sessions.ttl(),
        state.config.auth.secure_cookies,
    );
    let body = SessionInfo {
        username: session.username,
        csrf_token: session.csrf_token,
    };
    ([(SET_COOKIE, cookie)], Json(body)).into_response()
}

fn validation(message: &str) -> Error {
    farmavet_core::Error::validation(message).into()
}
