//! Refresh token storage and validity policy.
//!
//! Only refresh tokens are stored in the database; access tokens are
//! stateless. A token is usable iff it exists, has not been revoked and has
//! not expired — callers cannot tell those three failures apart.
//!
//! All timestamps are Unix epoch seconds and `now` is always supplied by
//! the caller, so tests never have to sleep.

use sqlx::sqlite::SqlitePool;

/// A persisted refresh token record.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub expires_at: i64,
    pub revoked_at: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: String,
    created_at: i64,
    updated_at: i64,
    expires_at: i64,
    revoked_at: Option<i64>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            token: row.token,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

/// Store for managing refresh tokens.
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new active token. A duplicate token string is a unique
    /// violation and surfaces to the caller; it is never retried here.
    pub async fn create(
        &self,
        token: &str,
        user_id: &str,
        now: i64,
        expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, created_at, updated_at, user_id, expires_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(token)
        .bind(now)
        .bind(now)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a token record regardless of validity.
    pub async fn get(&self, token: &str) -> Result<Option<RefreshToken>, sqlx::Error> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshToken::from))
    }

    /// Resolve a token to its owning user, only while the token is active:
    /// not revoked and not expired at `now`. Returns `None` otherwise,
    /// without distinguishing why.
    pub async fn lookup_active_user(
        &self,
        token: &str,
        now: i64,
    ) -> Result<Option<String>, sqlx::Error> {
        let record = self.get(token).await?;
        Ok(record
            .filter(|r| r.revoked_at.is_none() && now < r.expires_at)
            .map(|r| r.user_id))
    }

    /// Revoke a token. Idempotent: revoking a nonexistent or already-revoked
    /// token is a no-op, and the first revocation timestamp is kept.
    pub async fn revoke(&self, token: &str, now: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = ?, updated_at = ?
             WHERE token = ? AND revoked_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a token record entirely.
    pub async fn delete(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all tokens expired at `now`. Used by the cleanup scheduler.
    pub async fn delete_expired(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    async fn db_with_user() -> Database {
        let db = Database::open(":memory:").await.unwrap();
        db.users()
            .create("user-1", "a@x.com", "hashed")
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = db_with_user().await;
        let store = db.refresh_tokens();

        store.create("tok-1", "user-1", 1000, 2000).await.unwrap();

        let record = store.get("tok-1").await.unwrap().unwrap();
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.created_at, 1000);
        assert_eq!(record.expires_at, 2000);
        assert!(record.revoked_at.is_none());

        let user = store.lookup_active_user("tok-1", 1500).await.unwrap();
        assert_eq!(user.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_duplicate_token_fails() {
        let db = db_with_user().await;
        let store = db.refresh_tokens();

        store.create("tok-1", "user-1", 1000, 2000).await.unwrap();
        assert!(store.create("tok-1", "user-1", 1000, 2000).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_token_not_active() {
        let db = db_with_user().await;
        let user = db
            .refresh_tokens()
            .lookup_active_user("unknown", 1500)
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_not_active() {
        let db = db_with_user().await;
        let store = db.refresh_tokens();

        store.create("tok-1", "user-1", 1000, 2000).await.unwrap();

        // Expiry instant itself is already invalid
        assert!(
            store
                .lookup_active_user("tok-1", 2000)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .lookup_active_user("tok-1", 3000)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_revoked_token_not_active() {
        let db = db_with_user().await;
        let store = db.refresh_tokens();

        store.create("tok-1", "user-1", 1000, 9000).await.unwrap();
        store.revoke("tok-1", 1500).await.unwrap();

        assert!(
            store
                .lookup_active_user("tok-1", 1600)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            store.get("tok-1").await.unwrap().unwrap().revoked_at,
            Some(1500)
        );
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let db = db_with_user().await;
        let store = db.refresh_tokens();

        store.create("tok-1", "user-1", 1000, 9000).await.unwrap();
        store.revoke("tok-1", 1500).await.unwrap();
        store.revoke("tok-1", 1800).await.unwrap();

        // First revocation timestamp is kept
        assert_eq!(
            store.get("tok-1").await.unwrap().unwrap().revoked_at,
            Some(1500)
        );

        // Revoking an unknown token is not an error
        store.revoke("unknown", 1500).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let db = db_with_user().await;
        let store = db.refresh_tokens();

        store.create("tok-1", "user-1", 1000, 2000).await.unwrap();
        store.create("tok-2", "user-1", 1000, 9000).await.unwrap();

        let deleted = store.delete_expired(2000).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get("tok-1").await.unwrap().is_none());
        assert!(store.get("tok-2").await.unwrap().is_some());
    }
}
