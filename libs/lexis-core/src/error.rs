//! Error types for lexis-core.

use thiserror::Error;

/// Result type alias using ThresholdError.
pub type Result<T> = std::result::Result<T, ThresholdError>;

/// Errors found while validating a threshold row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("unknown state {value:?} in row {row}")]
    UnknownState { row: usize, value: String },

    #[error("duplicate threshold for state {state}")]
    DuplicateState { state: String },

    #[error("min_mastery_level {value} out of range 0-5 for state {state}")]
    MasteryOutOfRange { state: String, value: i64 },

    #[error("negative {field} ({value}) for state {state}")]
    NegativeRequirement {
        state: String,
        field: &'static str,
        value: i64,
    },

    #[error("{field} {value} for state {state} is too large")]
    RequirementOutOfRange {
        state: String,
        field: &'static str,
        value: i64,
    },

    #[error("invalid score_weight {value} for state {state}")]
    InvalidScoreWeight { state: String, value: f64 },

    #[error("invalid next_review_delay {value:?} for state {state}")]
    InvalidDelay { state: String, value: String },
}

/// Progress record bound violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("mastery level {value} out of range 0-5")]
    MasteryOutOfRange { value: i64 },

    #[error("negative {field}: {value}")]
    NegativeCounter { field: &'static str, value: i64 },

    #[error("correct streak {streak} exceeds review count {reviews}")]
    StreakExceedsReviews { streak: u32, reviews: u32 },

    #[error("invalid score {0}")]
    InvalidScore(f64),

    #[error("unknown state {0:?}")]
    UnknownState(String),
}
