//! Flashcard endpoints

use axum::{extract::State, Json};

use crate::error::{ApiError, Result};
use crate::models::{CreateFlashcardRequest, Flashcard, FlashcardListResponse};
use crate::AppState;

/// POST /api/flashcards
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateFlashcardRequest>,
) -> Result<Json<Flashcard>> {
    if payload.front_text.trim().is_empty() || payload.back_text.trim().is_empty() {
        return Err(ApiError::Validation(
            "front_text and back_text must not be empty".to_string(),
        ));
    }

    if let Some(lesson_id) = payload.lesson_id {
        state
            .db
            .get_lesson(lesson_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;
    }

    let card = state.db.create_flashcard(&payload).await?;
    tracing::debug!(flashcard_id = %card.id, "Created flashcard");

    Ok(Json(card))
}

/// GET /api/flashcards
pub async fn list(State(state): State<AppState>) -> Result<Json<FlashcardListResponse>> {
    let flashcards = state.db.list_flashcards().await?;
    Ok(Json(FlashcardListResponse { flashcards }))
}
