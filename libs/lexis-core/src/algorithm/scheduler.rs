//! Review scheduling.
//!
//! Maps a mastery state to the time the card should be shown again, either
//! from a configured delay table or from the built-in intervals.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::types::MasteryState;

/// Configured review delay per state.
pub type DelayTable = BTreeMap<MasteryState, Duration>;

/// Longest delay accepted from configuration (ten years).
pub const MAX_DELAY_HOURS: i64 = 24 * 365 * 10;

/// Built-in delay used when no configured delay exists for a state.
pub fn fallback_delay(state: MasteryState) -> Duration {
    match state {
        MasteryState::Unknown => Duration::hours(1),
        MasteryState::Learning => Duration::hours(4),
        MasteryState::Known => Duration::days(1),
        MasteryState::Mastered => Duration::days(3),
        MasteryState::LongTerm => Duration::days(7),
    }
}

/// Calculate when a card in `state` is next due.
pub fn next_review_at(
    state: MasteryState,
    now: DateTime<Utc>,
    delays: Option<&DelayTable>,
) -> DateTime<Utc> {
    let delay = delays
        .and_then(|table| table.get(&state).copied())
        .unwrap_or_else(|| fallback_delay(state));
    now.checked_add_signed(delay)
        .or_else(|| now.checked_add_signed(fallback_delay(state)))
        .unwrap_or(now)
}

/// Parse delay text such as `"4 hours"`, `"1 day"` or `"2 weeks"`.
///
/// Units are matched by prefix, case-insensitively. A value with an
/// unrecognized or missing unit is one hour. Returns `None` when the amount
/// is not a non-negative integer or the delay exceeds [`MAX_DELAY_HOURS`].
pub fn parse_delay(text: &str) -> Option<Duration> {
    let mut parts = text.split_whitespace();
    let value: i64 = parts.next()?.parse().ok()?;
    if value < 0 {
        return None;
    }

    let unit = parts.next().unwrap_or("").to_ascii_lowercase();
    let hours = if unit.starts_with("hour") {
        value
    } else if unit.starts_with("day") {
        value.checked_mul(24)?
    } else if unit.starts_with("week") {
        value.checked_mul(24 * 7)?
    } else {
        1
    };

    if hours > MAX_DELAY_HOURS {
        return None;
    }
    Duration::try_hours(hours)
}
