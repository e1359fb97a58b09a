//! CSRF tokens for mutating admin requests.

use http::Method;

use crate::error::Result;
use crate::password::random_hex;

/// Header carrying the CSRF token.
pub const CSRF_HEADER: &str = "x-csrf-token";

const CSRF_TOKEN_BYTES: usize = 32;

/// A fresh random token.
pub fn generate_csrf_token() -> Result<String> {
    random_hex(CSRF_TOKEN_BYTES)
}

/// Constant-time token comparison.
pub fn tokens_match(expected: &str, provided: &str) -> bool {
    let (a, b) = (expected.as_bytes(), provided.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Whether requests with this method must carry a CSRF token.
pub fn requires_csrf(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
