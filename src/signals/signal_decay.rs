// =============================================================================
// Signal Decay — Half-life freshness of UWR scores
// =============================================================================
//
// Theta-style exponential decay, applied at read time and never baked into a
// stored record:
//
//   decayed = base * 0.5 ^ (elapsed / half_life)
//
// Negative elapsed time (clock skew) counts as zero elapsed.  A non-positive
// half-life has no meaning and is rejected; everything else is coerced.
//
// Half-life adjustment:
//   adjusted = base_half_life * conviction / volatility
// Higher volatility shortens the half-life, higher conviction lengthens it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::error::DecayError;
use crate::signals::weighted_score::clamp01;

/// Default signal half-life used by validators, in hours.
pub const DEFAULT_SIGNAL_HALF_LIFE_HOURS: f64 = 24.0;

/// Neutral volatility / conviction factor.
pub const NEUTRAL_FACTOR: f64 = 1.0;

pub const MINUTES_PER_HOUR: f64 = 60.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

// =============================================================================
// Timestamps
// =============================================================================

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2025-01-01T00:00:00Z`, with any offset), a datetime
/// without offset (read as UTC), or a bare date (midnight UTC).
pub fn parse_iso8601(value: &str) -> Result<DateTime<Utc>, DecayError> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Ok(date
            .and_hms_opt(0, 0, 0)
            .map(|n| n.and_utc())
            .unwrap_or_default()),
        Err(e) => Err(DecayError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Elapsed time between two instants in minutes, floored at zero.
pub fn elapsed_minutes(scored_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let ms = (now - scored_at).num_milliseconds() as f64;
    (ms / MS_PER_MINUTE).max(0.0)
}

/// Signed age in hours.  Negative when `now` precedes `scored_at`.
pub fn age_hours(scored_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - scored_at).num_milliseconds() as f64 / MS_PER_HOUR
}

// =============================================================================
// Core decay math
// =============================================================================

fn check_half_life(half_life: f64) -> Result<(), DecayError> {
    // `!(x > 0)` also rejects NaN.
    if !(half_life > 0.0) {
        return Err(DecayError::InvalidHalfLife(half_life));
    }
    Ok(())
}

/// Fraction of value left after `half_lives` half-lives: `0.5 ^ n`.
pub fn remaining_after_half_lives(half_lives: f64) -> f64 {
    0.5_f64.powf(half_lives)
}

/// Decay `base` over `elapsed` time units with the given half-life (same
/// units).  Negative elapsed counts as zero.
fn decay_by(base: f64, elapsed: f64, half_life: f64) -> Result<f64, DecayError> {
    check_half_life(half_life)?;

    let base = if base.is_nan() { 0.0 } else { base };
    let elapsed = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };

    let decayed = base * remaining_after_half_lives(elapsed / half_life);
    if (0.0..=1.0).contains(&base) {
        Ok(clamp01(decayed))
    } else {
        Ok(decayed)
    }
}

/// Apply exponential half-life decay to `base_score` given when it was
/// scored and the current time.
///
/// The result is clamped into [0, 1] when `base_score` was in [0, 1].
///
/// # Errors
/// `DecayError::InvalidHalfLife` when `half_life_minutes <= 0` or NaN.
pub fn apply_time_decay(
    base_score: f64,
    scored_at: DateTime<Utc>,
    now: DateTime<Utc>,
    half_life_minutes: f64,
) -> Result<f64, DecayError> {
    let elapsed = elapsed_minutes(scored_at, now);
    let decayed = decay_by(base_score, elapsed, half_life_minutes)?;
    debug!(
        base_score,
        elapsed_minutes = elapsed,
        half_life_minutes,
        decayed,
        "time decay applied"
    );
    Ok(decayed)
}

/// [`apply_time_decay`] over ISO-8601 timestamp strings.
pub fn apply_time_decay_iso(
    base_score: f64,
    scored_at: &str,
    now: &str,
    half_life_minutes: f64,
) -> Result<f64, DecayError> {
    check_half_life(half_life_minutes)?;
    let scored_at = parse_iso8601(scored_at)?;
    let now = parse_iso8601(now)?;
    apply_time_decay(base_score, scored_at, now, half_life_minutes)
}

/// Half-life adjusted for market volatility and analyst conviction.
///
/// Pass [`NEUTRAL_FACTOR`] for either factor to leave it out.  The result
/// is not validated here; decay rejects it if it is not positive.
pub fn calculate_adjusted_half_life(base_half_life: f64, volatility: f64, conviction: f64) -> f64 {
    base_half_life * conviction / volatility
}

// =============================================================================
// Hour-based helpers for UWR scores
// =============================================================================

/// Decay a UWR score by its age in hours.
pub fn apply_time_decay_to_uwr_score(
    uwr_score: f64,
    age_hours: f64,
    half_life_hours: f64,
) -> Result<f64, DecayError> {
    decay_by(uwr_score, age_hours, half_life_hours)
}

/// Decay a UWR score with a half-life adjusted for volatility and
/// conviction.
pub fn apply_volatility_adjusted_decay(
    uwr_score: f64,
    age_hours: f64,
    volatility: f64,
    conviction: f64,
    base_half_life_hours: f64,
) -> Result<f64, DecayError> {
    let adjusted = calculate_adjusted_half_life(base_half_life_hours, volatility, conviction);
    apply_time_decay_to_uwr_score(uwr_score, age_hours, adjusted)
}
