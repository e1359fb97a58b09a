//! Request extractors and cookie builders.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{ConnectInfo, FromRequestParts};
use farmavet_auth::{SESSION_COOKIE, cookie_value};
use farmavet_core::Language;
use http::request::Parts;

use crate::state::AppState;

/// Cookie holding the visitor's language choice.
pub const LANG_COOKIE: &str = "lang";

const LANG_COOKIE_MAX_AGE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Language of the current visitor: the `lang` cookie, else the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteLanguage(pub Language);

impl FromRequestParts<AppState> for SiteLanguage {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let language = cookie_value(&parts.headers, LANG_COOKIE)
            .and_then(Language::parse_strict)
            .unwrap_or(state.config.i18n.default_language);
        Ok(Self(language))
    }
}

/// Client address used as the login throttle key.
///
/// Falls back to `"unknown"` when the server was not started with connect info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(addr))
    }
}

/// `Set-Cookie` value opening a session.
pub fn session_cookie(id: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value deleting the session cookie.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// `Set-Cookie` value remembering a language.
pub fn language_cookie(language: Language) -> String {
    format!(
        "{LANG_COOKIE}={}; Path=/; SameSite=Lax; Max-Age={}",
        language.code(),
        LANG_COOKIE_MAX_AGE.as_secs()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("abc", Duration::from_secs(7200), false);
        assert_eq!(
            cookie,
            "farmavet_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=7200"
        );
        assert!(session_cookie("abc", Duration::from_secs(1), true).ends_with("; Secure"));
    }

    #[test]
    fn test_language_cookie() {
        assert!(language_cookie(Language::En).starts_with("lang=en; Path=/"));
    }

    #[tokio::test]
    async fn test_client_addr_fallback() {
        let (mut parts, _) = http::Request::new(()).into_parts();
        let ClientAddr(addr) = ClientAddr::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(addr, "unknown");

        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 5555))));
        let ClientAddr(addr) = ClientAddr::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(addr, "10.0.0.7");
    }
}
