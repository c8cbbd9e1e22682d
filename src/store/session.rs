use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use tracing::instrument;

use crate::errors::StoreError;
use crate::models::user::CurrentUser;

/// Server-side session rows: `token` → user, valid until `expires_at` (unix seconds).
#[derive(Clone, Debug)]
pub struct SessionRepository {
    pool: Pool<Sqlite>,
}

impl SessionRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    #[instrument(name = "Storing new session", skip(self, token))]
    pub async fn create(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO session (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at.timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Resolves a live session and slides its expiry to `expires_at`.
    #[instrument(name = "Resolving session", skip(self, token))]
    pub async fn touch(
        &self,
        token: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<CurrentUser>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query("UPDATE session SET expires_at = ? WHERE token = ? AND expires_at > ?")
            .bind(expires_at.timestamp())
            .bind(token)
            .bind(now.timestamp())
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            tx.commit().await?;
            return Ok(None);
        }
        let user = sqlx::query_as::<_, CurrentUser>(
            r#"SELECT u.id, u.email FROM session s JOIN "user" u ON u.id = s.user_id WHERE s.token = ?"#,
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    #[instrument(name = "Deleting session", skip(self, token))]
    pub async fn delete(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM session WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(name = "Purging expired sessions", skip(self))]
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
