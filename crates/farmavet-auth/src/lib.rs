//! Admin authentication for FARMAVET Web.
//!
//! Provides:
//! - [`hash_password`] / [`verify_password`]: argon2id password hashes
//! - [`verify_login`]: verification that costs the same for unknown accounts
//! - [`check_password_strength`]: length and character-class rules
//! - [`LoginThrottle`] / [`LoginTicket`]: bounded per-client lockout after
//!   failed logins, with attempts reserved before the password is checked
//! - [`SessionStore`]: bounded in-memory sessions with sliding expiry
//! - [`AdminAuthLayer`] / [`AdminAuthService`]: Tower middleware checking the
//!   session cookie and CSRF token
//! - [`AuthenticatedAdmin`]: identity inserted into request extensions
//! - [`AuthError`]: auth-specific error types

pub mod clock;
pub mod csrf;
mod error;
mod middleware;
pub mod password;
pub mod session;
pub mod throttle;
mod user;

pub use clock::{Clock, ManualClock, SystemClock};
pub use csrf::{CSRF_HEADER, generate_csrf_token, tokens_match};
pub use error::{AuthError, Result};
pub use middleware::{
    AdminAuthLayer, AdminAuthService, cookie_value, error_response, session_id_from_headers,
    status_for,
};
pub use password::{
    check_password_strength, generate_password, hash_password, verify_login, verify_password,
};
pub use session::{SESSION_COOKIE, Session, SessionStore};
pub use throttle::{LoginThrottle, LoginTicket};
pub use user::{AuthenticatedAdmin, admin_from_parts, username_from_parts};
