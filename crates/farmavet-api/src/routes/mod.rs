//! HTTP routes.
//!
//! # Modules
//!
//! - [`public`]: health check and language switch
//! - [`pages`]: localised page payloads and the methodology feed
//! - [`auth`]: login, logout, session and password change
//! - [`admin`]: dashboard and generic content editing
//! - [`upload`]: image uploads

pub mod admin;
pub mod auth;
pub mod pages;
pub mod public;
pub mod upload;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use farmavet_auth::AdminAuthLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
///
/// Everything under `/admin` sits behind [`AdminAuthLayer`]; uploaded files
/// are served from the configured upload directory.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.uploads.max_bytes);

    let admin_routes = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/session", get(auth::session))
        .route("/admin/password", post(auth::change_password))
        .route(
            "/admin/content/{table}",
            get(admin::list).post(admin::create),
        )
        .route(
            "/admin/content/{table}/{id}",
            get(admin::show).put(admin::update).delete(admin::remove),
        )
        .route("/admin/upload", post(upload::upload).layer(upload_limit))
        .route_layer(AdminAuthLayer::new(state.sessions.clone()));

    let public_routes = Router::new()
        .route("/health", get(public::health))
        .route("/set_language/{lang}", get(public::set_language))
        .route("/api/pages/{page}", get(pages::page))
        .route("/api/metodologias", get(pages::methodology_feed))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .nest_service(
            upload::UPLOAD_URL_PREFIX,
            ServeDir::new(&state.config.uploads.dir),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
