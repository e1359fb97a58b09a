//! Application configuration.
//!
//! Loaded from `<config dir>/farmavet/config.toml` (or an explicit path /
//! `FARMAVET_CONFIG`), then overridden by a handful of environment variables:
//!
//! | variable | field |
//! |----------|-------|
//! | `FARMAVET_HOST` | `server.host` |
//! | `FARMAVET_PORT` | `server.port` |
//! | `FARMAVET_DATABASE_PATH` | `database.path` |
//! | `FARMAVET_UPLOAD_DIR` | `uploads.dir` |
//! | `FARMAVET_SECURE_COOKIES` | `auth.secure_cookies` |

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::traits::ConfigManager;

/// Default maximum upload size (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmavetConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// SQLite settings.
    pub database: DatabaseConfig,
    /// Upload storage settings.
    pub uploads: UploadConfig,
    /// Session and login settings.
    pub auth: AuthConfig,
    /// Language settings.
    pub i18n: I18nConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

impl ServerConfig {
    /// `host:port`, ready for a socket bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SQLite settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; created on first connect.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("instance/database.db"),
        }
    }
}

/// Upload storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory served under `/static/uploads`.
    pub dir: PathBuf,
    /// Largest accepted request body for uploads.
    pub max_bytes: usize,
    /// Accepted file extensions, lower-case, without the dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static/uploads"),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "webp", "svg"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl UploadConfig {
    /// Whether `extension` (any case, no dot) is on the allow-list.
    pub fn is_allowed(&self, extension: &str) -> bool {
        let ext = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|a| *a == ext)
    }
}

/// Session and login settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session lifetime, refreshed on every authenticated request.
    pub session_ttl_secs: u64,
    /// Failed logins allowed before a client is locked out.
    pub max_login_attempts: u32,
    /// Lockout window, measured from the last failed attempt.
    pub lockout_secs: u64,
    /// Maximum number of clients tracked by the login throttle.
    pub throttle_capacity: usize,
    /// Maximum number of concurrent sessions.
    pub session_capacity: usize,
    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 2 * 60 * 60,
            max_login_attempts: 5,
            lockout_secs: 300,
            throttle_capacity: 10_000,
            session_capacity: 1_000,
            secure_cookies: false,
        }
    }
}

impl AuthConfig {
    /// Session lifetime as a [`Duration`].
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Lockout window as a [`Duration`].
    pub fn lockout(&self) -> Duration {
        Duration::from_secs(self.lockout_secs)
    }
}

/// Language settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Language used when the visitor has not chosen one.
    pub default_language: Language,
}

impl FarmavetConfig {
    /// Apply overrides read through `lookup` (normally `std::env::var`).
    ///
    /// Unparseable numeric or boolean values are ignored with a warning.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FARMAVET_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("FARMAVET_PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid FARMAVET_PORT: {port}"),
            }
        }
        if let Some(path) = lookup("FARMAVET_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("FARMAVET_UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("FARMAVET_SECURE_COOKIES") {
            match parse_bool(&flag) {
                Some(secure) => self.auth.secure_cookies = secure,
                None => log::warn!("Ignoring invalid FARMAVET_SECURE_COOKIES: {flag}"),
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ConfigManager for FarmavetConfig {
    fn project_name() -> &'static str {
        "farmavet"
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ------------------------------------------------------------------------
    // Defaults
    // ------------------------------------------------------------------------

    #[test]
    fn test_defaults() {
        let config = FarmavetConfig::default();
        assert_eq!(config.server.bind_address(), "127.0.0.1:5001");
        assert_eq!(config.database.path, PathBuf::from("instance/database.db"));
        assert_eq!(config.uploads.max_bytes, 16 * 1024 * 1024);
        assert_eq!(config.auth.session_ttl(), Duration::from_secs(7200));
        assert_eq!(config.auth.max_login_attempts, 5);
        assert_eq!(config.auth.lockout(), Duration::from_secs(300));
        assert_eq!(config.i18n.default_language, Language::Es);
    }

    #[test]
    fn test_upload_allow_list() {
        let uploads = UploadConfig::default();
        assert!(uploads.is_allowed("png"));
        assert!(uploads.is_allowed("JPG"));
        assert!(!uploads.is_allowed("exe"));
        assert!(!uploads.is_allowed(""));
    }

    // ------------------------------------------------------------------------
    // TOML
    // ------------------------------------------------------------------------

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FarmavetConfig = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth, AuthConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = FarmavetConfig::default();
        let text = config.to_toml_string().unwrap();
        let back: FarmavetConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_i18n_language_from_toml() {
        let config: FarmavetConfig =
            toml::from_str("[i18n]\ndefault_language = \"en\"\n").unwrap();
        assert_eq!(config.i18n.default_language, Language::En);
    }

    // ------------------------------------------------------------------------
    // Overrides
    // ------------------------------------------------------------------------

    #[test]
    fn test_overrides_applied() {
        let mut config = FarmavetConfig::default();
        config.apply_overrides_from(lookup(&[
            ("FARMAVET_HOST", "0.0.0.0"),
            ("FARMAVET_PORT", "8000"),
            ("FARMAVET_DATABASE_PATH", "/data/farmavet.db"),
            ("FARMAVET_UPLOAD_DIR", "/data/uploads"),
            ("FARMAVET_SECURE_COOKIES", "true"),
        ]));
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.database.path, PathBuf::from("/data/farmavet.db"));
        assert_eq!(config.uploads.dir, PathBuf::from("/data/uploads"));
        assert!(config.auth.secure_cookies);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut config = FarmavetConfig::default();
        config.apply_overrides_from(lookup(&[
            ("FARMAVET_PORT", "eighty"),
            ("FARMAVET_SECURE_COOKIES", "maybe"),
        ]));
        assert_eq!(config.server.port, 5001);
        assert!(!config.auth.secure_cookies);
    }

    #[test]
    fn test_env_vars_export() {
        let vars = FarmavetConfig::default().to_env_vars().unwrap();
        assert!(vars.contains(&("FARMAVET_SERVER_PORT".to_string(), "5001".to_string())));
        assert!(
            vars.contains(&(
                "FARMAVET_I18N_DEFAULT_LANGUAGE".to_string(),
                "es".to_string()
            ))
        );
    }
}
