//! Administrator accounts.
//!
//! Only the password hash is stored; hashing lives in the auth crate.

use serde::Serialize;

use crate::database::Database;
use crate::error::{Error, Result};

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Admin {
    /// Row id
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// PHC-formatted password hash
    #[serde(skip)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: Option<String>,
}

const ADMIN_COLUMNS: &str = "id, username, password_hash, created_at";

impl Database {
    /// Admin by login name.
    pub async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE username = ?");
        let admin = sqlx::query_as::<_, Admin>(&sql)
            .bind(username)
            .fetch_optional(self.pool())
            .await?;
        Ok(admin)
    }

    /// Admin by id.
    pub async fn find_admin(&self, id: i64) -> Result<Option<Admin>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = ?");
        let admin = sqlx::query_as::<_, Admin>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(admin)
    }

    /// Create an admin and return its id.
    ///
    /// Fails with [`Error::Conflict`] when the username is taken.
    pub async fn create_admin(&self, username: &str, password_hash: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO admins (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(self.pool())
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Error::conflict(format!("admin '{username}'"))
                }
                _ => Error::from(e),
            })?;
        log::info!("Created admin '{username}'");
        Ok(result.last_insert_rowid())
    }

    /// Replace an admin's password hash. Returns false when no such admin.
    pub async fn update_admin_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE admins SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of admin accounts.
    pub async fn admin_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn db() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = db().await;
        assert_eq!(db.admin_count().await.unwrap(), 0);
        let id = db.create_admin("admin", "$argon2id$hash").await.unwrap();
        let admin = db.find_admin_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.id, id);
        assert_eq!(admin.password_hash, "$argon2id$hash");
        assert!(admin.created_at.is_some());
        assert_eq!(db.find_admin(id).await.unwrap(), Some(admin));
        assert_eq!(db.admin_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let db = db().await;
        db.create_admin("admin", "h1").await.unwrap();
        let err = db.create_admin("admin", "h2").await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(err.to_string(), "admin 'admin' already exists");
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = db().await;
        let id = db.create_admin("admin", "old").await.unwrap();
        assert!(db.update_admin_password(id, "new").await.unwrap());
        let admin = db.find_admin(id).await.unwrap().unwrap();
        assert_eq!(admin.password_hash, "new");
        assert!(!db.update_admin_password(id + 1, "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_admin() {
        let db = db().await;
        assert!(db.find_admin_by_username("nadie").await.unwrap().is_none());
        assert!(db.find_admin(1).await.unwrap().is_none());
    }

    #[test]
    fn test_hash_not_serialized() {
        let admin = Admin {
            id: 1,
            username: "admin".into(),
            password_hash: "secret".into(),
            created_at: None,
        };
        let json = serde_json::to_string(&admin).unwrap();
        assert!(!json.contains("secret"));
    }
}
