//! Practice endpoints

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedLearner;
use crate::services::QueueFilter;
use crate::AppState;

/// GET /api/practice/queue
pub async fn queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    Query(query): Query<PracticeQueueQuery>,
) -> Result<Json<PracticeQueueResponse>> {
    let filter = QueueFilter {
        lesson_id: query.lesson_id,
        state: query.state().map_err(ApiError::Validation)?,
    };

    if let Some(lesson_id) = filter.lesson_id {
        state
            .db
            .get_lesson(lesson_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;
    }

    let snapshot = state
        .engine
        .practice_queue(auth.learner_id, filter, Utc::now())
        .await?;

    let flashcards: HashMap<_, _> = state
        .db
        .list_flashcards()
        .await?
        .into_iter()
        .map(|card| (card.id, card))
        .collect();

    let limit = query.limit.unwrap_or(usize::MAX);
    let cards = snapshot
        .queue
        .entries()
        .filter_map(|(bucket, id)| {
            let card = flashcards.get(&id)?;
            let progress = snapshot.progress.get(&id);
            Some(QueueCard {
                flashcard_id: id,
                bucket,
                front_text: card.front_text.clone(),
                back_text: card.back_text.clone(),
                example_sentence: card.example_sentence.clone(),
                state: progress.map_or(MasteryState::Unknown, |p| p.state),
                mastery_level: progress.map_or(0, |p| p.mastery_level),
                correct_streak: progress.map_or(0, |p| p.correct_streak),
                review_count: progress.map_or(0, |p| p.review_count),
                next_review: progress.and_then(|p| p.next_review),
            })
        })
        .take(limit)
        .collect();

    Ok(Json(PracticeQueueResponse {
        cards,
        due_count: snapshot.queue.due.len(),
        unseen_count: snapshot.queue.unseen.len(),
        scheduled_count: snapshot.queue.scheduled.len(),
    }))
}

/// POST /api/practice/review
pub async fn review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<CardProgress>> {
    let outcome = payload.outcome().map_err(ApiError::Validation)?;

    state
        .db
        .get_flashcard(payload.flashcard_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flashcard not found".to_string()))?;

    let progress = state
        .engine
        .apply_review(auth.learner_id, payload.flashcard_id, outcome)
        .await?;

    Ok(Json(progress))
}
