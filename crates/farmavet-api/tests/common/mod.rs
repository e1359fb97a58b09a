//! Common test harness for farmavet-api integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use farmavet_api::{AppState, build_router};
use farmavet_auth::{CSRF_HEADER, hash_password};
use farmavet_core::FarmavetConfig;
use farmavet_storage::Database;
use http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use http::{Method, Request, Response, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Username seeded into every harness database.
pub const USERNAME: &str = "editor";
/// Password of [`USERNAME`].
pub const PASSWORD: &str = "Farmavet2024";

/// Router over a migrated in-memory database with one admin account.
pub struct TestHarness {
    /// Application state shared with the router
    pub state: AppState,
    /// Upload directory, removed on drop
    pub uploads: TempDir,
}

/// Cookie and CSRF token of a logged-in admin.
#[derive(Debug, Clone)]
pub struct Login {
    /// `farmavet_session=<id>`
    pub cookie: String,
    /// Token for `X-CSRF-Token`
    pub csrf: String,
}

impl TestHarness {
    /// Harness with default configuration.
    pub async fn new() -> Self {
        Self::with_config(FarmavetConfig::default()).await
    }

    /// Harness with `config`; the upload dir is replaced by a temp dir.
    pub async fn with_config(mut config: FarmavetConfig) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        config.uploads.dir = uploads.path().to_path_buf();
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.create_admin(USERNAME, &hash_password(PASSWORD).unwrap())
            .await
            .unwrap();
        Self {
            state: AppState::new(db, config),
            uploads,
        }
    }

    /// A fresh router over the shared state.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Send one request.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    /// `GET path` with optional cookies.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// JSON request with optional session.
    pub async fn json(
        &self,
        method: Method,
        path: &str,
        login: Option<&Login>,
        body: &Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json");
        if let Some(login) = login {
            builder = builder
                .header(COOKIE, &login.cookie)
                .header(CSRF_HEADER, &login.csrf);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Log in with `password` and return the raw response.
    pub async fn try_login(&self, password: &str) -> Response<Body> {
        let body = serde_json::json!({ "username": USERNAME, "password": password });
        self.json(Method::POST, "/login", None, &body).await
    }

    /// Log in as [`USERNAME`].
    pub async fn login(&self) -> Login {
        let response = self.try_login(PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = cookie_pair(&response);
        let json = body_json(response).await;
        Login {
            cookie,
            csrf: json["csrf_token"].as_str().unwrap().to_string(),
        }
    }
}

/// `name=value` part of the response's `Set-Cookie` header.
pub fn cookie_pair(response: &Response<Body>) -> String {
    let header = response.headers()[SET_COOKIE].to_str().unwrap();
    header.split(';').next().unwrap().to_string()
}

/// Response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Multipart body with a `file` part and an optional `folder` part.
pub fn multipart_body(boundary: &str, filename: &str, content: &[u8], folder: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(folder) = folder {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"folder\"\r\n\r\n{folder}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
