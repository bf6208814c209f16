//! State requirement thresholds.
//!
//! Administrators edit thresholds as loosely typed rows. Rows are validated
//! into a [`ThresholdTable`] before the classifier or scheduler sees them.

use std::collections::HashSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::algorithm::scheduler::{parse_delay, DelayTable};
use crate::error::{Result, ThresholdError};
use crate::types::{MasteryState, MAX_MASTERY_LEVEL};

/// Threshold row as stored and edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawThreshold {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub min_mastery_level: i64,
    pub min_correct_streak: i64,
    pub min_review_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_response_time_ms: Option<i64>,
    pub score_weight: f64,
    pub next_review_delay: String,
}

/// Validated requirements for reaching a state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateThreshold {
    pub state: MasteryState,
    pub min_mastery_level: u8,
    pub min_correct_streak: u32,
    pub min_review_count: u32,
    /// Reviews slower than this do not qualify.
    pub max_response_time_ms: Option<u32>,
    pub score_weight: f64,
    pub next_review_delay: Duration,
}

impl StateThreshold {
    /// Whether a review result meets every requirement of this row.
    pub fn admits(
        &self,
        mastery_level: u8,
        correct_streak: u32,
        review_count: u32,
        response_time_ms: i64,
    ) -> bool {
        mastery_level >= self.min_mastery_level
            && correct_streak >= self.min_correct_streak
            && review_count >= self.min_review_count
            && self
                .max_response_time_ms
                .map_or(true, |max| response_time_ms <= max as i64)
    }

    fn sort_key(&self) -> (u8, u32, u32, MasteryState) {
        (
            self.min_mastery_level,
            self.min_correct_streak,
            self.min_review_count,
            self.state,
        )
    }
}

// state, level, streak, reviews, max ms, weight, delay
const STANDARD: [(MasteryState, u8, u32, u32, Option<u32>, f64, &str); 5] = [
    (MasteryState::Unknown, 0, 0, 0, None, 0.0, "1 hour"),
    (MasteryState::Learning, 1, 0, 1, None, 1.0, "4 hours"),
    (MasteryState::Known, 2, 0, 2, None, 2.0, "1 day"),
    (MasteryState::Mastered, 3, 0, 3, None, 3.0, "3 days"),
    (MasteryState::LongTerm, 5, 5, 10, Some(5000), 4.0, "1 week"),
];

/// Threshold rows ordered from least to most demanding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThresholdTable {
    rows: Vec<StateThreshold>,
}

impl ThresholdTable {
    /// Table with no rows; classification falls back to the fixed ladder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in table seeded into an empty store.
    pub fn standard() -> Self {
        let rows = STANDARD
            .iter()
            .map(|&(state, level, streak, reviews, max_ms, weight, delay)| StateThreshold {
                state,
                min_mastery_level: level,
                min_correct_streak: streak,
                min_review_count: reviews,
                max_response_time_ms: max_ms,
                score_weight: weight,
                next_review_delay: parse_delay(delay).unwrap_or_else(|| Duration::hours(1)),
            })
            .collect();
        Self::from_validated(rows)
    }

    /// Raw form of the built-in table.
    pub fn standard_rows() -> Vec<RawThreshold> {
        STANDARD
            .iter()
            .map(|&(state, level, streak, reviews, max_ms, weight, delay)| RawThreshold {
                state: state.as_str().to_string(),
                name: None,
                description: None,
                min_mastery_level: level as i64,
                min_correct_streak: streak as i64,
                min_review_count: reviews as i64,
                max_response_time_ms: max_ms.map(i64::from),
                score_weight: weight,
                next_review_delay: delay.to_string(),
            })
            .collect()
    }

    /// Validate every row, failing on the first malformed one.
    pub fn from_rows(rows: &[RawThreshold]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(rows.len());
        for (index, raw) in rows.iter().enumerate() {
            let threshold = validate_row(index, raw)?;
            if !seen.insert(threshold.state) {
                return Err(ThresholdError::DuplicateState {
                    state: threshold.state.to_string(),
                });
            }
            validated.push(threshold);
        }
        Ok(Self::from_validated(validated))
    }

    /// Keep the valid rows and report the rejected ones.
    ///
    /// For duplicated states the first valid row wins.
    pub fn from_rows_lenient(rows: &[RawThreshold]) -> (Self, Vec<ThresholdError>) {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        for (index, raw) in rows.iter().enumerate() {
            match validate_row(index, raw) {
                Ok(threshold) if seen.insert(threshold.state) => validated.push(threshold),
                Ok(threshold) => rejected.push(ThresholdError::DuplicateState {
                    state: threshold.state.to_string(),
                }),
                Err(err) => rejected.push(err),
            }
        }
        (Self::from_validated(validated), rejected)
    }

    fn from_validated(mut rows: Vec<StateThreshold>) -> Self {
        rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows from least to most demanding.
    pub fn iter(&self) -> impl Iterator<Item = &StateThreshold> {
        self.rows.iter()
    }

    /// Rows from most to least demanding.
    pub fn strictest_first(&self) -> impl Iterator<Item = &StateThreshold> {
        self.rows.iter().rev()
    }

    pub fn get(&self, state: MasteryState) -> Option<&StateThreshold> {
        self.rows.iter().find(|row| row.state == state)
    }

    /// Configured review delays keyed by state.
    pub fn delay_table(&self) -> DelayTable {
        self.rows
            .iter()
            .map(|row| (row.state, row.next_review_delay))
            .collect()
    }

    /// Base score credited for being in `state`.
    ///
    /// Uses the row's score weight, or the state's rank when no row exists.
    pub fn base_score(&self, state: MasteryState) -> f64 {
        self.get(state)
            .map_or(state.rank() as f64, |row| row.score_weight)
    }
}

fn validate_row(index: usize, raw: &RawThreshold) -> Result<StateThreshold> {
    let state = MasteryState::from_str(&raw.state).ok_or_else(|| ThresholdError::UnknownState {
        row: index,
        value: raw.state.clone(),
    })?;
    let name = state.to_string();

    if !(0..=MAX_MASTERY_LEVEL as i64).contains(&raw.min_mastery_level) {
        return Err(ThresholdError::MasteryOutOfRange {
            state: name,
            value: raw.min_mastery_level,
        });
    }

    let min_correct_streak = non_negative(&name, "min_correct_streak", raw.min_correct_streak)?;
    let min_review_count = non_negative(&name, "min_review_count", raw.min_review_count)?;
    let max_response_time_ms = raw
        .max_response_time_ms
        .map(|ms| non_negative(&name, "max_response_time_ms", ms))
        .transpose()?;

    if !raw.score_weight.is_finite() || raw.score_weight < 0.0 {
        return Err(ThresholdError::InvalidScoreWeight {
            state: name,
            value: raw.score_weight,
        });
    }

    let next_review_delay =
        parse_delay(&raw.next_review_delay).ok_or_else(|| ThresholdError::InvalidDelay {
            state: name.clone(),
            value: raw.next_review_delay.clone(),
        })?;

    Ok(StateThreshold {
        state,
        min_mastery_level: raw.min_mastery_level as u8,
        min_correct_streak,
        min_review_count,
        max_response_time_ms,
        score_weight: raw.score_weight,
        next_review_delay,
    })
}

fn non_negative(state: &str, field: &'static str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(ThresholdError::NegativeRequirement {
            state: state.to_string(),
            field,
            value,
        });
    }
    u32::try_from(value).map_err(|_| ThresholdError::RequirementOutOfRange {
        state: state.to_string(),
        field,
        value,
    })
}
