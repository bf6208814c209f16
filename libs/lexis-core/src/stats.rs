//! Aggregate progress statistics for a learner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CardProgress, MasteryState};

/// Summary shown on the learner dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_words: usize,
    pub words_mastered: usize,
    pub unknown_count: usize,
    pub learning_count: usize,
    pub known_count: usize,
    pub mastered_count: usize,
    pub long_term_count: usize,
    pub due_count: usize,
    pub total_reviews: u64,
    pub average_score: f64,
}

impl ProgressSummary {
    /// Summarize `progress` over a deck of `total_cards` cards.
    ///
    /// Cards with no progress count as unknown. Average score is taken over
    /// reviewed cards only and rounded to two decimals.
    pub fn collect(progress: &[CardProgress], total_cards: usize, now: DateTime<Utc>) -> Self {
        let mut summary = Self {
            total_words: total_cards.max(progress.len()),
            ..Self::default()
        };

        let mut score_sum = 0.0;
        for p in progress {
            match p.state {
                MasteryState::Unknown => summary.unknown_count += 1,
                MasteryState::Learning => summary.learning_count += 1,
                MasteryState::Known => summary.known_count += 1,
                MasteryState::Mastered => summary.mastered_count += 1,
                MasteryState::LongTerm => summary.long_term_count += 1,
            }
            if p.is_due(now) {
                summary.due_count += 1;
            }
            summary.total_reviews += p.review_count as u64;
            score_sum += p.score;
        }

        summary.unknown_count += summary.total_words - progress.len();
        summary.words_mastered = summary.mastered_count + summary.long_term_count;
        if !progress.is_empty() {
            summary.average_score = (score_sum / progress.len() as f64 * 100.0).round() / 100.0;
        }
        summary
    }
}
