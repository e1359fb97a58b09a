//! Password hashing, strength rules and random secrets.

use std::sync::OnceLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{AuthError, Result};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const SALT_BYTES: usize = 16;

/// Fill `len` random bytes from the OS and hex-encode them.
pub fn random_hex(len: usize) -> Result<String> {
    let mut buf = vec![0u8; len];
    getrandom::getrandom(&mut buf).map_err(|e| AuthError::Random(e.to_string()))?;
    Ok(hex::encode(buf))
}

/// Hash a password as an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AuthError::Random(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored password hash is malformed: {e}");
            false
        }
    }
}

/// Check a login password against the account's hash, if there is an account.
///
/// Without an account the password is still verified against a fixed hash
/// and the result discarded, so both cases take the same time.
pub fn verify_login(password: &str, hash: Option<&str>) -> bool {
    match hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = dummy_hash() {
                let _ = verify_password(password, dummy);
            }
            false
        }
    }
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("sin-cuenta").ok())
        .as_deref()
}

/// Reject passwords that are too short or miss a character class.
///
/// Rules are checked in order and the first failure is reported.
pub fn check_password_strength(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(
            "La contraseña debe tener al menos 8 caracteres",
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(AuthError::WeakPassword(
            "La contraseña debe contener al menos una letra mayúscula",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(AuthError::WeakPassword(
            "La contraseña debe contener al menos una letra minúscula",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "La contraseña debe contener al menos un número",
        ));
    }
    Ok(())
}

/// A random password that passes [`check_password_strength`].
pub fn generate_password() -> Result<String> {
    // Hex alone has no upper-case letters and may lack letters entirely.
    Ok(format!("Fv{}7", random_hex(10)?))
}
