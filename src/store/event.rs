use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::instrument;

use crate::errors::StoreError;
use crate::models::event::{EventFields, EventModel};

const COLUMNS: &str = "id, user_id, name, category, place, address, start_datetime, end_datetime, is_virtual";

#[derive(Clone, Debug)]
pub struct EventRepository {
    pool: Pool<Sqlite>,
}

impl EventRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    #[instrument(name = "Saving new event to database", skip(conn, fields))]
    pub async fn insert(
        conn: &mut SqliteConnection,
        user_id: i64,
        fields: &EventFields,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO event (user_id, name, category, place, address, start_datetime, end_datetime, is_virtual)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&fields.name)
        .bind(fields.category)
        .bind(&fields.place)
        .bind(&fields.address)
        .bind(fields.start_datetime)
        .bind(fields.end_datetime)
        .bind(fields.is_virtual)
        .execute(conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Overwrites every mutable field; `id` and `user_id` stay as they are.
    #[instrument(name = "Updating event in database", skip(conn, fields))]
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &EventFields,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE event
            SET name = ?, category = ?, place = ?, address = ?,
                start_datetime = ?, end_datetime = ?, is_virtual = ?
            WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(fields.category)
        .bind(&fields.place)
        .bind(&fields.address)
        .bind(fields.start_datetime)
        .bind(fields.end_datetime)
        .bind(fields.is_virtual)
        .bind(id)
        .execute(conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(name = "Deleting event from database", skip(conn))]
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM event WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub async fn fetch_in(conn: &mut SqliteConnection, id: i64) -> Result<EventModel, StoreError> {
        let event = sqlx::query_as::<_, EventModel>(&format!(
            "SELECT {COLUMNS} FROM event WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(conn)
        .await?;
        Ok(event)
    }

    #[instrument(name = "Fetching event by id from database", skip(self))]
    pub async fn fetch(&self, id: i64) -> Result<EventModel, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_in(&mut conn, id).await
    }

    /// Fetch all events belonging to a specific user, in insertion order.
    #[instrument(name = "Listing events of user from database", skip(self))]
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<EventModel>, StoreError> {
        let rows = sqlx::query_as::<_, EventModel>(&format!(
            "SELECT {COLUMNS} FROM event WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
