//! Threshold settings endpoints

use axum::{extract::State, Json};
use lexis_core::ThresholdTable;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/settings/thresholds
pub async fn get_thresholds(State(state): State<AppState>) -> Result<Json<ThresholdsResponse>> {
    let thresholds = state
        .db
        .get_state_thresholds()
        .await
        .map_err(|err| ApiError::Configuration(format!("thresholds unavailable: {err}")))?;

    let (_, rejected) = ThresholdTable::from_rows_lenient(&thresholds);

    Ok(Json(ThresholdsResponse {
        thresholds,
        rejected: rejected.iter().map(ToString::to_string).collect(),
    }))
}

/// PUT /api/settings/thresholds
/// Replaces the whole table; any malformed row rejects the request
pub async fn update_thresholds(
    State(state): State<AppState>,
    Json(request): Json<UpdateThresholdsRequest>,
) -> Result<Json<ThresholdsResponse>> {
    ThresholdTable::from_rows(&request.thresholds)?;

    let thresholds: Vec<RawThreshold> = request
        .thresholds
        .into_iter()
        .map(|mut row| {
            if let Some(canonical) = MasteryState::from_str(&row.state) {
                row.state = canonical.as_str().to_string();
            }
            row
        })
        .collect();

    state.db.replace_state_thresholds(&thresholds).await?;
    tracing::info!(rows = thresholds.len(), "State thresholds replaced");

    Ok(Json(ThresholdsResponse {
        thresholds,
        rejected: Vec::new(),
    }))
}
