//! Progress endpoints

use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::db::DbError;
use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedLearner;
use crate::AppState;

/// GET /api/progress/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<ProgressSummary>> {
    let summary = state.engine.summary(auth.learner_id, Utc::now()).await?;
    Ok(Json(summary))
}

/// GET /api/progress/words
pub async fn words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<WordStatesResponse>> {
    let (thresholds, _) = state.engine.load_thresholds().await?;
    let rows = state.db.get_word_states(auth.learner_id).await?;

    let now = Utc::now();
    let words = rows
        .into_iter()
        .map(|row| WordStateEntry::from_row(row, &thresholds, now).map_err(DbError::from))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Json(WordStatesResponse { words }))
}

/// DELETE /api/progress
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<ResetProgressResponse>> {
    let deleted = state.engine.reset_progress(auth.learner_id).await?;
    Ok(Json(ResetProgressResponse { deleted }))
}
