//! Practice queue selection.
//!
//! Orders cards for smart practice: review backlog first, then cards never
//! seen, then cards that are not yet due.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::CardProgress;

/// Which part of the queue a card was placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueBucket {
    Due,
    Unseen,
    Scheduled,
}

/// Cards partitioned into the three practice buckets, each already ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PracticeQueue {
    pub due: Vec<Uuid>,
    pub unseen: Vec<Uuid>,
    pub scheduled: Vec<Uuid>,
}

impl PracticeQueue {
    /// Partition `card_ids` by their progress at `now`.
    ///
    /// Progress for cards outside `card_ids` is ignored and duplicate ids
    /// appear once. A missing `next_review` counts as due at `now`.
    pub fn build(progress: &[CardProgress], card_ids: &[Uuid], now: DateTime<Utc>) -> Self {
        let by_card: HashMap<Uuid, &CardProgress> =
            progress.iter().map(|p| (p.flashcard_id, p)).collect();

        let mut seen = HashSet::with_capacity(card_ids.len());
        let mut due = Vec::new();
        let mut unseen = Vec::new();
        let mut scheduled = Vec::new();

        for &id in card_ids {
            if !seen.insert(id) {
                continue;
            }
            match by_card.get(&id) {
                None => unseen.push(id),
                Some(p) => {
                    let at = p.next_review.unwrap_or(now);
                    if at <= now {
                        due.push((at, id));
                    } else {
                        scheduled.push((at, id));
                    }
                }
            }
        }

        // Stable sorts keep input order among equal timestamps.
        due.sort_by_key(|&(at, _)| at);
        scheduled.sort_by_key(|&(at, _)| at);

        Self {
            due: due.into_iter().map(|(_, id)| id).collect(),
            unseen,
            scheduled: scheduled.into_iter().map(|(_, id)| id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.due.len() + self.unseen.len() + self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue entries in presentation order, tagged with their bucket.
    pub fn entries(&self) -> impl Iterator<Item = (QueueBucket, Uuid)> + '_ {
        let due = self.due.iter().map(|&id| (QueueBucket::Due, id));
        let unseen = self.unseen.iter().map(|&id| (QueueBucket::Unseen, id));
        let scheduled = self.scheduled.iter().map(|&id| (QueueBucket::Scheduled, id));
        due.chain(unseen).chain(scheduled)
    }

    /// Card ids in presentation order.
    pub fn into_ordered(self) -> Vec<Uuid> {
        let mut ordered = self.due;
        ordered.extend(self.unseen);
        ordered.extend(self.scheduled);
        ordered
    }
}

/// Ordered practice queue: due, then unseen, then scheduled.
pub fn select_queue(progress: &[CardProgress], card_ids: &[Uuid], now: DateTime<Utc>) -> Vec<Uuid> {
    PracticeQueue::build(progress, card_ids, now).into_ordered()
}
