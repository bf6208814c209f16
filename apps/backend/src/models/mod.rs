//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from lexis-core
pub use lexis_core::{
    CardProgress, MasteryState, ProgressSummary, QueueBucket, RawThreshold, ReviewOutcome,
    ThresholdTable, ValidationError,
};

/// Latency assumed when a review does not report one.
pub const DEFAULT_RESPONSE_TIME_MS: i64 = 5000;

// === Database Entity Types ===

/// Registered learner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Learner {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Vocabulary flashcard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Flashcard {
    pub id: Uuid,
    pub front_text: String,
    pub back_text: String,
    pub example_sentence: Option<String>,
    pub lesson_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Ordered group of flashcards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
}

/// Lesson with one learner's completion counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub flashcard_count: i64,
    /// Cards the learner has in the mastered or long-term state
    pub mastered_count: i64,
}

/// Progress row in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct DbCardProgress {
    pub user_id: Uuid,
    pub flashcard_id: Uuid,
    pub state: String,
    pub mastery_level: i64,
    pub correct_streak: i64,
    pub review_count: i64,
    pub score: f64,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
    pub response_time_ms: Option<i64>,
}

impl DbCardProgress {
    /// Create from lexis-core CardProgress
    pub fn from_core(progress: &CardProgress) -> Self {
        Self {
            user_id: progress.user_id,
            flashcard_id: progress.flashcard_id,
            state: progress.state.as_str().to_string(),
            mastery_level: progress.mastery_level as i64,
            correct_streak: progress.correct_streak as i64,
            review_count: progress.review_count as i64,
            score: progress.score,
            last_reviewed: progress.last_reviewed,
            next_review: progress.next_review,
            response_time_ms: progress.response_time_ms,
        }
    }

    /// Convert to lexis-core CardProgress, checking the record bounds
    pub fn into_core(self) -> Result<CardProgress, ValidationError> {
        let state = MasteryState::from_str(&self.state)
            .ok_or_else(|| ValidationError::UnknownState(self.state.clone()))?;
        let mastery_level = u8::try_from(self.mastery_level)
            .map_err(|_| ValidationError::MasteryOutOfRange {
                value: self.mastery_level,
            })?;
        let correct_streak = counter("correct_streak", self.correct_streak)?;
        let review_count = counter("review_count", self.review_count)?;

        let progress = CardProgress {
            user_id: self.user_id,
            flashcard_id: self.flashcard_id,
            state,
            mastery_level,
            correct_streak,
            review_count,
            score: self.score,
            last_reviewed: self.last_reviewed,
            next_review: self.next_review,
            response_time_ms: self.response_time_ms,
        };
        progress.validate()?;
        Ok(progress)
    }
}

fn counter(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::NegativeCounter { field, value })
}

/// Threshold row in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct DbStateThreshold {
    pub state: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_mastery_level: i64,
    pub min_correct_streak: i64,
    pub min_review_count: i64,
    pub max_response_time_ms: Option<i64>,
    pub score_weight: f64,
    pub next_review_delay: String,
}

impl DbStateThreshold {
    pub fn into_raw(self) -> RawThreshold {
        RawThreshold {
            state: self.state,
            name: self.name,
            description: self.description,
            min_mastery_level: self.min_mastery_level,
            min_correct_streak: self.min_correct_streak,
            min_review_count: self.min_review_count,
            max_response_time_ms: self.max_response_time_ms,
            score_weight: self.score_weight,
            next_review_delay: self.next_review_delay,
        }
    }
}

/// Reviewed flashcard joined with its progress
#[derive(Debug, Clone, FromRow)]
pub struct DbWordState {
    pub flashcard_id: Uuid,
    pub front_text: String,
    pub back_text: String,
    pub example_sentence: Option<String>,
    pub lesson_title: Option<String>,
    pub state: String,
    pub mastery_level: i64,
    pub score: f64,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
}

// === API Request/Response Types ===

/// Learner registration request
#[derive(Debug, Deserialize)]
pub struct RegisterLearnerRequest {
    pub name: Option<String>,
}

/// Learner registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterLearnerResponse {
    pub learner_id: Uuid,
    pub token: String,
}

/// Learner status response
#[derive(Debug, Serialize, Deserialize)]
pub struct LearnerStatusResponse {
    pub learner_id: Uuid,
    pub name: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}

/// Create flashcard request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFlashcardRequest {
    pub front_text: String,
    pub back_text: String,
    #[serde(default)]
    pub example_sentence: Option<String>,
    #[serde(default)]
    pub lesson_id: Option<Uuid>,
}

/// Flashcard list response
#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardListResponse {
    pub flashcards: Vec<Flashcard>,
}

/// Create lesson request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

/// Lesson list response
#[derive(Debug, Serialize, Deserialize)]
pub struct LessonListResponse {
    pub lessons: Vec<LessonSummary>,
}

/// One card in the practice queue
#[derive(Debug, Serialize, Deserialize)]
pub struct QueueCard {
    pub flashcard_id: Uuid,
    pub bucket: QueueBucket,
    pub front_text: String,
    pub back_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    pub state: MasteryState,
    pub mastery_level: u8,
    pub correct_streak: u32,
    pub review_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

/// Practice queue query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PracticeQueueQuery {
    pub limit: Option<usize>,
    /// Only cards of this lesson
    pub lesson_id: Option<Uuid>,
    /// Only cards currently in this state; unseen cards are "unknown"
    pub state: Option<String>,
}

impl PracticeQueueQuery {
    /// Parsed state filter
    pub fn state(&self) -> Result<Option<MasteryState>, String> {
        self.state
            .as_deref()
            .map(|raw| MasteryState::from_str(raw).ok_or_else(|| format!("unknown state '{raw}'")))
            .transpose()
    }
}

/// Practice queue response
#[derive(Debug, Serialize, Deserialize)]
pub struct PracticeQueueResponse {
    pub cards: Vec<QueueCard>,
    pub due_count: usize,
    pub unseen_count: usize,
    pub scheduled_count: usize,
}

/// Submit review request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub flashcard_id: Uuid,
    pub correct: bool,
    #[serde(default)]
    pub response_time_ms: Option<i64>,
}

impl SubmitReviewRequest {
    /// Review outcome, rejecting negative latencies
    pub fn outcome(&self) -> Result<ReviewOutcome, String> {
        let response_time_ms = self.response_time_ms.unwrap_or(DEFAULT_RESPONSE_TIME_MS);
        if response_time_ms < 0 {
            return Err(format!("response_time_ms must not be negative, got {response_time_ms}"));
        }
        Ok(ReviewOutcome {
            correct: self.correct,
            response_time_ms,
        })
    }
}

/// Per-word progress entry
#[derive(Debug, Serialize, Deserialize)]
pub struct WordStateEntry {
    pub flashcard_id: Uuid,
    pub keyword: String,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    pub lesson_title: Option<String>,
    pub state: MasteryState,
    pub mastery_level: i64,
    pub base_score: f64,
    pub score: f64,
    pub total_score: f64,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
    pub needs_review: bool,
}

impl WordStateEntry {
    /// Entry for a reviewed card, scored against `thresholds`
    pub fn from_row(
        row: DbWordState,
        thresholds: &ThresholdTable,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let state = MasteryState::from_str(&row.state)
            .ok_or_else(|| ValidationError::UnknownState(row.state.clone()))?;
        let base_score = thresholds.base_score(state);

        Ok(Self {
            flashcard_id: row.flashcard_id,
            keyword: row.front_text,
            translation: row.back_text,
            example_sentence: row.example_sentence,
            lesson_title: row.lesson_title,
            state,
            mastery_level: row.mastery_level,
            base_score,
            score: row.score,
            total_score: ((row.score + base_score) * 100.0).round() / 100.0,
            last_reviewed: row.last_reviewed,
            next_review: row.next_review,
            needs_review: row.next_review.map_or(true, |at| at <= now),
        })
    }
}

/// Word states response
#[derive(Debug, Serialize, Deserialize)]
pub struct WordStatesResponse {
    pub words: Vec<WordStateEntry>,
}

/// Reset progress response
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetProgressResponse {
    pub deleted: u64,
}

/// Threshold settings response
#[derive(Debug, Serialize, Deserialize)]
pub struct ThresholdsResponse {
    pub thresholds: Vec<RawThreshold>,
    /// Stored rows the engine skips, with the reason
    #[serde(default)]
    pub rejected: Vec<String>,
}

/// Replace threshold settings request
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateThresholdsRequest {
    pub thresholds: Vec<RawThreshold>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn db_row() -> DbCardProgress {
        DbCardProgress {
            user_id: Uuid::new_v4(),
            flashcard_id: Uuid::new_v4(),
            state: "known".to_string(),
            mastery_level: 2,
            correct_streak: 2,
            review_count: 4,
            score: 3.1,
            last_reviewed: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
            next_review: Some(Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap()),
            response_time_ms: Some(2400),
        }
    }

    #[test]
    fn converts_between_db_and_core() {
        let core = db_row().into_core().unwrap();
        assert_eq!(core.state, MasteryState::Known);
        assert_eq!(core.review_count, 4);

        let back = DbCardProgress::from_core(&core);
        assert_eq!(back.state, "known");
        assert_eq!(back.into_core().unwrap(), core);
    }

    #[test]
    fn legacy_state_name_is_read_as_unknown() {
        let mut row = db_row();
        row.state = "new".to_string();
        assert_eq!(row.into_core().unwrap().state, MasteryState::Unknown);
    }

    #[test]
    fn rejects_rows_outside_bounds() {
        let mut row = db_row();
        row.mastery_level = -1;
        assert!(matches!(
            row.into_core(),
            Err(ValidationError::MasteryOutOfRange { value: -1 })
        ));

        let mut row = db_row();
        row.correct_streak = -3;
        assert!(matches!(
            row.into_core(),
            Err(ValidationError::NegativeCounter { field: "correct_streak", .. })
        ));

        let mut row = db_row();
        row.state = "expert".to_string();
        assert!(matches!(row.into_core(), Err(ValidationError::UnknownState(_))));
    }

    #[test]
    fn word_entry_adds_base_score() {
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
        let row = DbWordState {
            flashcard_id: Uuid::new_v4(),
            front_text: "libro".to_string(),
            back_text: "book".to_string(),
            example_sentence: None,
            lesson_title: Some("Objects".to_string()),
            state: "known".to_string(),
            mastery_level: 2,
            score: 3.1,
            last_reviewed: Some(now - chrono::Duration::days(2)),
            next_review: Some(now - chrono::Duration::days(1)),
        };

        let entry = WordStateEntry::from_row(row.clone(), &ThresholdTable::standard(), now).unwrap();
        assert_eq!(entry.keyword, "libro");
        assert_eq!(entry.lesson_title.as_deref(), Some("Objects"));
        assert_eq!(entry.base_score, 2.0);
        assert_eq!(entry.total_score, 5.1);
        assert!(entry.needs_review);

        let entry = WordStateEntry::from_row(row, &ThresholdTable::empty(), now).unwrap();
        assert_eq!(entry.base_score, 2.0);

        let unscheduled = DbWordState {
            state: "long-term".to_string(),
            next_review: Some(now + chrono::Duration::days(7)),
            ..db_word()
        };
        let entry = WordStateEntry::from_row(unscheduled, &ThresholdTable::standard(), now).unwrap();
        assert_eq!(entry.base_score, 4.0);
        assert!(!entry.needs_review);
    }

    fn db_word() -> DbWordState {
        DbWordState {
            flashcard_id: Uuid::new_v4(),
            front_text: "agua".to_string(),
            back_text: "water".to_string(),
            example_sentence: None,
            lesson_title: None,
            state: "unknown".to_string(),
            mastery_level: 0,
            score: 0.0,
            last_reviewed: None,
            next_review: None,
        }
    }

    #[test]
    fn queue_query_parses_state_filter() {
        let query = PracticeQueueQuery {
            state: Some("long_term".to_string()),
            ..Default::default()
        };
        assert_eq!(query.state().unwrap(), Some(MasteryState::LongTerm));

        assert_eq!(PracticeQueueQuery::default().state().unwrap(), None);

        let bad = PracticeQueueQuery {
            state: Some("expert".to_string()),
            ..Default::default()
        };
        assert!(bad.state().is_err());
    }

    #[test]
    fn review_request_defaults_latency() {
        let request = SubmitReviewRequest {
            flashcard_id: Uuid::new_v4(),
            correct: true,
            response_time_ms: None,
        };
        assert_eq!(request.outcome().unwrap().response_time_ms, DEFAULT_RESPONSE_TIME_MS);

        let negative = SubmitReviewRequest {
            response_time_ms: Some(-1),
            ..request
        };
        assert!(negative.outcome().is_err());
    }
}
