//! Proficiency score.
//!
//! score = mastery level + streak bonus (up to 1) + latency bonus (up to 1),
//! rounded half-up to two decimals. The sum is built in hundredths so the
//! rounding is exact.

/// Streak length that earns the full streak bonus.
pub const FULL_STREAK: u32 = 5;

/// Responses at or above this latency earn no latency bonus.
pub const LATENCY_CUTOFF_MS: i64 = 5000;

/// Compute the proficiency score for a card after a review.
pub fn compute_score(mastery_level: u8, correct_streak: u32, response_time_ms: i64) -> f64 {
    let base = mastery_level as i64 * 100;
    let streak_bonus = correct_streak.min(FULL_STREAK) as i64 * 100 / FULL_STREAK as i64;

    let remaining = (LATENCY_CUTOFF_MS - response_time_ms.max(0)).clamp(0, LATENCY_CUTOFF_MS);
    // remaining / 5000 in hundredths, rounded half-up
    let latency_bonus = (remaining * 100 + LATENCY_CUTOFF_MS / 2) / LATENCY_CUTOFF_MS;

    (base + streak_bonus + latency_bonus) as f64 / 100.0
}
