//! Core spaced repetition library for vocabulary practice.
//!
//! Provides:
//! - Score, state classification and review scheduling
//! - Validated state threshold tables
//! - Practice queue selection
//! - Progress statistics
//! - Shared types (CardProgress, MasteryState, ReviewOutcome)

pub mod algorithm;
pub mod error;
pub mod selector;
pub mod stats;
pub mod thresholds;
pub mod types;

pub use algorithm::{apply_outcome, classify, compute_score, next_review_at, Classification, DelayTable};
pub use error::{Result, ThresholdError, ValidationError};
pub use selector::{select_queue, PracticeQueue, QueueBucket};
pub use stats::ProgressSummary;
pub use thresholds::{RawThreshold, StateThreshold, ThresholdTable};
pub use types::{CardProgress, MasteryState, ReviewOutcome, MAX_MASTERY_LEVEL};
