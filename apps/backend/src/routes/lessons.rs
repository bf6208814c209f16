//! Lesson endpoints

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::{CreateLessonRequest, Lesson, LessonListResponse};
use crate::routes::auth::AuthenticatedLearner;
use crate::AppState;

/// POST /api/lessons
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<Json<Lesson>> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be empty".to_string()));
    }

    let lesson = state.db.create_lesson(&payload).await?;
    tracing::debug!(lesson_id = %lesson.id, title = %lesson.title, "Created lesson");

    Ok(Json(lesson))
}

/// GET /api/lessons
///
/// Lessons in display order, each with the caller's mastered count.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<LessonListResponse>> {
    let lessons = state.db.list_lessons_for_user(auth.learner_id).await?;
    Ok(Json(LessonListResponse { lessons }))
}
