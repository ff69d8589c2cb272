//! # User Repository
//!
//! Shopper accounts. Sign-up and login live outside this service; the API
//! only needs to resolve ids and the seed binary needs to create accounts.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use gebeya_core::User;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email already registered
    pub async fn create(&self, name: &str, email: &str, is_admin: bool) -> DbResult<User> {
        debug!(email = %email, is_admin, "Creating user");

        let now = Utc::now();
        let email = email.trim().to_lowercase();

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, is_admin, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(name.trim())
        .bind(&email)
        .bind(is_admin)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, email.clone()),
            other => other,
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            name: name.trim().to_string(),
            email,
            is_admin,
            created_at: now,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, is_admin, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, is_admin, created_at FROM users WHERE email = ?1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::test_db;
    use crate::DbError;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = test_db().await;
        let user = db.users().create("Hana", " Hana@Example.com ", true).await.unwrap();

        assert_eq!(user.email, "hana@example.com");
        assert!(user.is_admin);

        let by_id = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Hana");

        let by_email = db.users().get_by_email("HANA@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(db.users().get_by_id(user.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let db = test_db().await;
        db.users().create("A", "a@example.com", false).await.unwrap();

        let err = db.users().create("B", "a@example.com", false).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "a@example.com"));
        assert_eq!(db.users().count().await.unwrap(), 1);
    }
}
