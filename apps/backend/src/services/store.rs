//! Persistence boundary of the progress engine.

use async_trait::async_trait;
use lexis_core::{CardProgress, RawThreshold};
use uuid::Uuid;

use crate::db::{Database, DbError};

/// Storage operations the progress engine depends on.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Progress of one learner on one card, if any review was recorded
    async fn get_progress(
        &self,
        user_id: Uuid,
        flashcard_id: Uuid,
    ) -> Result<Option<CardProgress>, DbError>;

    /// Insert or replace a record keyed by (user_id, flashcard_id)
    async fn upsert_progress(&self, record: &CardProgress) -> Result<CardProgress, DbError>;

    /// Current threshold rows, unvalidated
    async fn get_state_thresholds(&self) -> Result<Vec<RawThreshold>, DbError>;

    async fn get_all_progress_for_user(&self, user_id: Uuid) -> Result<Vec<CardProgress>, DbError>;

    async fn get_all_card_ids(&self) -> Result<Vec<Uuid>, DbError>;

    async fn get_card_ids_for_lesson(&self, lesson_id: Uuid) -> Result<Vec<Uuid>, DbError>;

    /// Wipe a learner's progress, returning the number of records removed
    async fn delete_all_progress_for_user(&self, user_id: Uuid) -> Result<u64, DbError>;
}

#[async_trait]
impl ProgressStore for Database {
    async fn get_progress(
        &self,
        user_id: Uuid,
        flashcard_id: Uuid,
    ) -> Result<Option<CardProgress>, DbError> {
        Database::get_progress(self, user_id, flashcard_id).await
    }

    async fn upsert_progress(&self, record: &CardProgress) -> Result<CardProgress, DbError> {
        Database::upsert_progress(self, record).await
    }

    async fn get_state_thresholds(&self) -> Result<Vec<RawThreshold>, DbError> {
        Database::get_state_thresholds(self).await
    }

    async fn get_all_progress_for_user(&self, user_id: Uuid) -> Result<Vec<CardProgress>, DbError> {
        Database::get_all_progress_for_user(self, user_id).await
    }

    async fn get_all_card_ids(&self) -> Result<Vec<Uuid>, DbError> {
        Database::get_all_card_ids(self).await
    }

    async fn get_card_ids_for_lesson(&self, lesson_id: Uuid) -> Result<Vec<Uuid>, DbError> {
        Database::get_card_ids_for_lesson(self, lesson_id).await
    }

    async fn delete_all_progress_for_user(&self, user_id: Uuid) -> Result<u64, DbError> {
        Database::delete_all_progress_for_user(self, user_id).await
    }
}
