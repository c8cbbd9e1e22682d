use tracing::instrument;

use crate::{
    errors::StoreError,
    models::{EventFields, EventModel},
    store::EventRepository,
};

/// Event operations. Each mutation runs in its own transaction, committed only
/// when every statement succeeded; dropping an uncommitted transaction rolls it back.
#[derive(Clone, Debug)]
pub struct EventService {
    repo: EventRepository,
}

impl EventService {
    pub fn new(repo: EventRepository) -> Self {
        Self { repo }
    }

    #[instrument(name = "Service: Create event", skip(self, fields))]
    pub async fn create(&self, owner: i64, fields: &EventFields) -> Result<EventModel, StoreError> {
        let mut tx = self.repo.pool().begin().await?;
        let id = EventRepository::insert(&mut tx, owner, fields).await?;
        let event = EventRepository::fetch_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(event)
    }

    pub async fn list_for(&self, owner: i64) -> Result<Vec<EventModel>, StoreError> {
        self.repo.list_by_user(owner).await
    }

    pub async fn get(&self, id: i64) -> Result<EventModel, StoreError> {
        self.repo.fetch(id).await
    }

    #[instrument(name = "Service: Delete event", skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.repo.pool().begin().await?;
        EventRepository::delete(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Fetches an event for editing. Events of other users are reported as missing.
    pub async fn get_owned(&self, id: i64, owner: i64) -> Result<EventModel, StoreError> {
        let event = self.repo.fetch(id).await?;
        if event.user_id != owner {
            tracing::warn!(event_id = id, owner, "Event belongs to another user");
            return Err(StoreError::NotFound);
        }
        Ok(event)
    }

    #[instrument(name = "Service: Update event", skip(self, fields))]
    pub async fn update(
        &self,
        id: i64,
        owner: i64,
        fields: &EventFields,
    ) -> Result<EventModel, StoreError> {
        let mut tx = self.repo.pool().begin().await?;
        let current = EventRepository::fetch_in(&mut tx, id).await?;
        if current.user_id != owner {
            tracing::warn!(event_id = id, owner, "Event belongs to another user");
            return Err(StoreError::NotFound);
        }
        EventRepository::update(&mut tx, id, fields).await?;
        let event = EventRepository::fetch_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(event)
    }
}
