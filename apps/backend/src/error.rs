//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lexis_core::ThresholdError;
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ThresholdError> for ApiError {
    fn from(err: ThresholdError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotAuthenticated(_) => (StatusCode::UNAUTHORIZED, "not_authenticated"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error"),
            ApiError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lexis_core::MasteryState;

    #[test]
    fn test_not_authenticated_status() {
        let error = ApiError::NotAuthenticated("missing token".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_not_found_status() {
        let error = ApiError::NotFound("flashcard 123".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_status() {
        let error = ApiError::Validation("negative latency".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_persistence_status() {
        let error = ApiError::Persistence(DbError::InvalidData("bad row".to_string()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_configuration_status() {
        let error = ApiError::Configuration("thresholds unavailable".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_threshold_error_is_validation() {
        let error: ApiError = ThresholdError::DuplicateState {
            state: MasteryState::Known.to_string(),
        }
        .into();
        assert!(matches!(error, ApiError::Validation(_)));
    }

    #[test]
    fn test_error_display_not_authenticated() {
        let error = ApiError::NotAuthenticated("invalid token".to_string());
        assert_eq!(error.to_string(), "Not authenticated: invalid token");
    }

    #[test]
    fn test_error_display_persistence() {
        let error = ApiError::Persistence(DbError::InvalidData("bad row".to_string()));
        assert_eq!(error.to_string(), "Persistence error: invalid data: bad row");
    }
}
