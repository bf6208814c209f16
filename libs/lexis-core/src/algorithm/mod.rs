//! Spaced repetition algorithm: classification, scoring and scheduling.

pub mod classifier;
pub mod scheduler;
pub mod score;

use chrono::{DateTime, Utc};

use crate::thresholds::ThresholdTable;
use crate::types::{CardProgress, ReviewOutcome};

pub use classifier::{classify, fallback_state, Classification};
pub use scheduler::{fallback_delay, next_review_at, parse_delay, DelayTable};
pub use score::compute_score;

/// Apply one review outcome to a progress record.
///
/// Pure composition of classifier, score and scheduler. The returned record
/// is what gets persisted; `previous` is left untouched.
pub fn apply_outcome(
    previous: &CardProgress,
    outcome: ReviewOutcome,
    thresholds: &ThresholdTable,
    now: DateTime<Utc>,
) -> CardProgress {
    let classification = classify(previous, outcome.correct, outcome.response_time_ms, thresholds);

    let score = compute_score(
        classification.mastery_level,
        classification.correct_streak,
        outcome.response_time_ms,
    );

    let delays = (!thresholds.is_empty()).then(|| thresholds.delay_table());
    let next_review = next_review_at(classification.state, now, delays.as_ref());

    CardProgress {
        user_id: previous.user_id,
        flashcard_id: previous.flashcard_id,
        state: classification.state,
        mastery_level: classification.mastery_level,
        correct_streak: classification.correct_streak,
        review_count: classification.review_count,
        score,
        last_reviewed: Some(now),
        next_review: Some(next_review),
        response_time_ms: Some(outcome.response_time_ms),
    }
}
