//! First-start seeding.

use farmavet_auth::{generate_password, hash_password};
use farmavet_storage::Database;

use crate::error::Result;

/// Username of the seeded account.
pub const DEFAULT_ADMIN: &str = "admin";

/// Create the `admin` account when no admin exists yet.
///
/// The generated password is logged once at `warn`. Returns the new id, or
/// `None` when admins were already present.
pub async fn seed_default_admin(db: &Database) -> Result<Option<i64>> {
    if db.admin_count().await? > 0 {
        return Ok(None);
    }
    let password = generate_password()?;
    let id = db
        .create_admin(DEFAULT_ADMIN, &hash_password(&password)?)
        .await?;
    tracing::warn!(
        username = DEFAULT_ADMIN,
        password = %password,
        "created default admin account; change this password after first login"
    );
    Ok(Some(id))
}
