use crate::errors::StoreError;
use crate::models::user::UserModel;
use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: Pool<Sqlite>,
}

impl UserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Inserts a user inside the caller's transaction. A taken email surfaces as
    /// [`StoreError::Conflict`].
    #[instrument(name = "Saving new user to database", skip(conn, password_hash))]
    pub async fn create_user(
        conn: &mut SqliteConnection,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(r#"INSERT INTO "user" (email, pwd) VALUES (?, ?)"#)
            .bind(email)
            .bind(password_hash)
            .execute(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to execute query: {:?}", e);
                StoreError::from(e)
            })?;
        Ok(result.last_insert_rowid())
    }

    #[instrument(name = "Fetching user by email from database", skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, StoreError> {
        let user = sqlx::query_as::<_, UserModel>(
            r#"SELECT id, email, pwd FROM "user" WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user: {:?}", e);
            StoreError::from(e)
        })?;
        Ok(user)
    }
}
