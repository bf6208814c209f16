//! Progress engine: applies reviews and reads learner progress.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lexis_core::{
    apply_outcome, CardProgress, MasteryState, PracticeQueue, ProgressSummary, ReviewOutcome,
    ThresholdError, ThresholdTable,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::services::locks::KeyedLocks;
use crate::services::retry::RetryPolicy;
use crate::services::store::ProgressStore;

/// Practice queue along with the progress it was built from.
#[derive(Debug, Clone, Default)]
pub struct PracticeSnapshot {
    pub queue: PracticeQueue,
    pub progress: HashMap<Uuid, CardProgress>,
}

/// Narrows the practice queue to part of the deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFilter {
    pub lesson_id: Option<Uuid>,
    /// Cards without progress count as [`MasteryState::Unknown`].
    pub state: Option<MasteryState>,
}

/// Coordinates classification, scoring and scheduling with persistence.
///
/// Reviews of the same (learner, card) pair are serialized; each one reads
/// the latest stored record and the current thresholds before writing.
pub struct ProgressEngine {
    store: Arc<dyn ProgressStore>,
    retry: RetryPolicy,
    locks: KeyedLocks<(Uuid, Uuid)>,
}

impl ProgressEngine {
    pub fn new(store: Arc<dyn ProgressStore>, retry: RetryPolicy) -> Self {
        Self {
            store,
            retry,
            locks: KeyedLocks::new(),
        }
    }

    /// Record a review outcome now.
    pub async fn apply_review(
        &self,
        user_id: Uuid,
        flashcard_id: Uuid,
        outcome: ReviewOutcome,
    ) -> Result<CardProgress> {
        self.apply_review_at(user_id, flashcard_id, outcome, Utc::now())
            .await
    }

    /// Record a review outcome as of `now`.
    ///
    /// On a persistence failure the stored record is left as it was.
    pub async fn apply_review_at(
        &self,
        user_id: Uuid,
        flashcard_id: Uuid,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> Result<CardProgress> {
        if outcome.response_time_ms < 0 {
            return Err(ApiError::Validation(format!(
                "response_time_ms must not be negative, got {}",
                outcome.response_time_ms
            )));
        }

        let _guard = self.locks.lock((user_id, flashcard_id)).await;
        let store = &*self.store;

        let previous = self
            .retry
            .run("get_progress", move || store.get_progress(user_id, flashcard_id))
            .await?
            .unwrap_or_else(|| CardProgress::new(user_id, flashcard_id));

        let thresholds = self.current_thresholds().await;
        let next = apply_outcome(&previous, outcome, &thresholds, now);

        let record = &next;
        let saved = self
            .retry
            .run("upsert_progress", move || store.upsert_progress(record))
            .await?;

        tracing::info!(
            %user_id,
            %flashcard_id,
            correct = outcome.correct,
            from = %previous.state,
            to = %saved.state,
            score = saved.score,
            "Review applied"
        );

        Ok(saved)
    }

    /// Read and validate the stored thresholds.
    ///
    /// Malformed rows are skipped and returned alongside the table.
    pub async fn load_thresholds(&self) -> Result<(ThresholdTable, Vec<ThresholdError>)> {
        let store = &*self.store;
        let rows = self
            .retry
            .run("get_state_thresholds", move || store.get_state_thresholds())
            .await
            .map_err(|err| ApiError::Configuration(format!("thresholds unavailable: {err}")))?;

        Ok(ThresholdTable::from_rows_lenient(&rows))
    }

    /// Thresholds for classifying a review, falling back to the built-in
    /// ladder when they cannot be read.
    async fn current_thresholds(&self) -> ThresholdTable {
        match self.load_thresholds().await {
            Ok((table, rejected)) => {
                for err in &rejected {
                    tracing::warn!(error = %err, "Skipping malformed threshold row");
                }
                table
            }
            Err(err) => {
                tracing::warn!(error = %err, "Using built-in progression");
                ThresholdTable::empty()
            }
        }
    }

    /// Practice order for a learner over the cards matching `filter`.
    pub async fn practice_queue(
        &self,
        user_id: Uuid,
        filter: QueueFilter,
        now: DateTime<Utc>,
    ) -> Result<PracticeSnapshot> {
        let store = &*self.store;
        let progress = self
            .retry
            .run("get_all_progress_for_user", move || {
                store.get_all_progress_for_user(user_id)
            })
            .await?;
        let mut card_ids = match filter.lesson_id {
            Some(lesson_id) => {
                self.retry
                    .run("get_card_ids_for_lesson", move || {
                        store.get_card_ids_for_lesson(lesson_id)
                    })
                    .await?
            }
            None => {
                self.retry
                    .run("get_all_card_ids", move || store.get_all_card_ids())
                    .await?
            }
        };

        let progress: HashMap<Uuid, CardProgress> = progress
            .into_iter()
            .map(|p| (p.flashcard_id, p))
            .collect();

        if let Some(state) = filter.state {
            card_ids.retain(|id| {
                progress.get(id).map_or(MasteryState::Unknown, |p| p.state) == state
            });
        }

        let records: Vec<CardProgress> = card_ids
            .iter()
            .filter_map(|id| progress.get(id).cloned())
            .collect();
        let queue = PracticeQueue::build(&records, &card_ids, now);
        tracing::debug!(%user_id, ?filter, cards = queue.len(), "Built practice queue");

        Ok(PracticeSnapshot { queue, progress })
    }

    pub async fn summary(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<ProgressSummary> {
        let store = &*self.store;
        let progress = self
            .retry
            .run("get_all_progress_for_user", move || {
                store.get_all_progress_for_user(user_id)
            })
            .await?;
        let card_ids = self
            .retry
            .run("get_all_card_ids", move || store.get_all_card_ids())
            .await?;

        Ok(ProgressSummary::collect(&progress, card_ids.len(), now))
    }

    /// Remove all of a learner's progress; the next review of any card
    /// starts from scratch.
    pub async fn reset_progress(&self, user_id: Uuid) -> Result<u64> {
        let store = &*self.store;
        let deleted = self
            .retry
            .run("delete_all_progress_for_user", move || {
                store.delete_all_progress_for_user(user_id)
            })
            .await?;

        tracing::info!(%user_id, deleted, "Progress reset");
        Ok(deleted)
    }
}
