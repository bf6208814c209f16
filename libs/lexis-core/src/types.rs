//! Core types for vocabulary progress tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Highest mastery level a card can reach.
pub const MAX_MASTERY_LEVEL: u8 = 5;

/// Coarse mastery classification, ordered by proficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MasteryState {
    #[serde(alias = "new")]
    Unknown,
    Learning,
    Known,
    Mastered,
    LongTerm,
}

impl Default for MasteryState {
    fn default() -> Self {
        Self::Unknown
    }
}

impl MasteryState {
    /// All states, least proficient first.
    pub const ALL: [MasteryState; 5] = [
        Self::Unknown,
        Self::Learning,
        Self::Known,
        Self::Mastered,
        Self::LongTerm,
    ];

    /// Get the state name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Learning => "learning",
            Self::Known => "known",
            Self::Mastered => "mastered",
            Self::LongTerm => "long-term",
        }
    }

    /// Parse from string. `new` is the legacy name of `unknown`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "unknown" | "new" => Some(Self::Unknown),
            "learning" => Some(Self::Learning),
            "known" => Some(Self::Known),
            "mastered" => Some(Self::Mastered),
            "long-term" | "long_term" => Some(Self::LongTerm),
            _ => None,
        }
    }

    /// Position in the proficiency order (0 for unknown).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Learning => 1,
            Self::Known => 2,
            Self::Mastered => 3,
            Self::LongTerm => 4,
        }
    }
}

impl std::fmt::Display for MasteryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single review as reported by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub correct: bool,
    pub response_time_ms: i64,
}

impl ReviewOutcome {
    pub fn correct(response_time_ms: i64) -> Self {
        Self {
            correct: true,
            response_time_ms,
        }
    }

    pub fn incorrect(response_time_ms: i64) -> Self {
        Self {
            correct: false,
            response_time_ms,
        }
    }
}

/// Progress of one learner on one flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProgress {
    pub user_id: Uuid,
    pub flashcard_id: Uuid,
    pub state: MasteryState,
    pub mastery_level: u8,
    pub correct_streak: u32,
    pub review_count: u32,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<i64>,
}

impl CardProgress {
    /// Zero state used before the first review of a card.
    pub fn new(user_id: Uuid, flashcard_id: Uuid) -> Self {
        Self {
            user_id,
            flashcard_id,
            state: MasteryState::Unknown,
            mastery_level: 0,
            correct_streak: 0,
            review_count: 0,
            score: 0.0,
            last_reviewed: None,
            next_review: None,
            response_time_ms: None,
        }
    }

    /// A card without a next review time is due immediately.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.map_or(true, |next| next <= now)
    }

    /// Check the record invariants. Used where records enter from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mastery_level > MAX_MASTERY_LEVEL {
            return Err(ValidationError::MasteryOutOfRange {
                value: self.mastery_level as i64,
            });
        }
        if self.correct_streak > self.review_count {
            return Err(ValidationError::StreakExceedsReviews {
                streak: self.correct_streak,
                reviews: self.review_count,
            });
        }
        if !self.score.is_finite() || self.score < 0.0 {
            return Err(ValidationError::InvalidScore(self.score));
        }
        Ok(())
    }
}
