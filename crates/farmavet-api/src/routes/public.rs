//! Health check and language switch.

use axum::Json;
use axum::extract::Path;
use axum::response::{IntoResponse, Redirect, Response};
use farmavet_core::Language;
use http::HeaderMap;
use http::header::{REFERER, SET_COOKIE};
use serde::Serialize;

use crate::extract::language_cookie;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always `"ok"`
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /set_language/{lang}`
///
/// Remembers `es` or `en` in the `lang` cookie (other values are ignored) and
/// sends the visitor back to the page they came from.
pub async fn set_language(Path(lang): Path<String>, headers: HeaderMap) -> Response {
    let target = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(referer_path)
        .unwrap_or("/")
        .to_string();

    match Language::parse_strict(&lang) {
        Some(language) => {
            tracing::debug!(language = language.code(), "language switched");
            (
                [(SET_COOKIE, language_cookie(language))],
                Redirect::to(&target),
            )
                .into_response()
        }
        None => Redirect::to(&target).into_response(),
    }
}

/// Local path of a `Referer` URL, if it is safe to redirect to.
fn referer_path(referer: &str) -> Option<&str> {
    let rest = match referer.split_once("://") {
        Some((_, after_scheme)) => &after_scheme[after_scheme.find('/')?..],
        None => referer,
    };
    let path = rest.split(['?', '#']).next().unwrap_or(rest);
    let usable =
        path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/set_language/");
    usable.then_some(path)
}
