//! Mastery state classification.

use serde::{Deserialize, Serialize};

use crate::thresholds::ThresholdTable;
use crate::types::{CardProgress, MasteryState, MAX_MASTERY_LEVEL};

/// Counters and state after applying one review outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub state: MasteryState,
    pub mastery_level: u8,
    pub correct_streak: u32,
    pub review_count: u32,
}

/// Classify a card after a review.
///
/// The most demanding threshold row the new counters satisfy decides the
/// state. When no row matches, the fixed streak ladder is used instead.
pub fn classify(
    previous: &CardProgress,
    correct: bool,
    response_time_ms: i64,
    thresholds: &ThresholdTable,
) -> Classification {
    let correct_streak = if correct {
        previous.correct_streak.saturating_add(1)
    } else {
        0
    };
    let mastery_level = if correct {
        previous.mastery_level.saturating_add(1).min(MAX_MASTERY_LEVEL)
    } else {
        previous.mastery_level.min(MAX_MASTERY_LEVEL).saturating_sub(1)
    };
    let review_count = previous.review_count.saturating_add(1);

    let state = thresholds
        .strictest_first()
        .find(|row| row.admits(mastery_level, correct_streak, review_count, response_time_ms))
        .map(|row| row.state)
        .unwrap_or_else(|| fallback_state(correct, correct_streak, response_time_ms));

    Classification {
        state,
        mastery_level,
        correct_streak,
        review_count,
    }
}

/// Fixed ladder used when the threshold table gives no answer.
pub fn fallback_state(correct: bool, correct_streak: u32, response_time_ms: i64) -> MasteryState {
    if !correct && correct_streak == 0 {
        return MasteryState::Unknown;
    }
    match correct_streak {
        s if s >= 10 && response_time_ms <= 5000 => MasteryState::LongTerm,
        s if s >= 5 => MasteryState::Mastered,
        s if s >= 3 => MasteryState::Known,
        s if s >= 1 => MasteryState::Learning,
        _ => MasteryState::Unknown,
    }
}
