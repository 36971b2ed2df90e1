// =============================================================================
// Validator Score — Read-time decay of an analyst record
// =============================================================================
//
// The validator's view of a record's freshness.  Half-life starts from the
// 24h default and is stretched by the analyst's conviction and shrunk by the
// market volatility the caller supplies:
//
//   halfLifeHours = base * conviction / volatility
//   decayedScore  = uwrScore * 0.5 ^ (max(ageHours, 0) / halfLifeHours)
//
// The output is ephemeral.  Nothing is written back to the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyst::score_record::ScoreRecord;
use crate::error::DecayError;
use crate::scoring_config::ScoringConfig;
use crate::signals::signal_decay::{
    age_hours, apply_time_decay, calculate_adjusted_half_life, DEFAULT_SIGNAL_HALF_LIFE_HOURS,
    MINUTES_PER_HOUR,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorScoreOutput {
    pub base_score: f64,
    pub decayed_score: f64,
    /// Signed; negative when `now` precedes `scoredAt`.
    pub age_hours: f64,
    pub half_life_hours: f64,
    pub conviction: f64,
    pub volatility: f64,
}

/// Decay `record` to `now` with the default 24h base half-life.
///
/// # Errors
/// `DecayError::InvalidHalfLife` when the adjusted half-life is not a
/// positive finite number (zero conviction, non-positive volatility).
pub fn compute_validator_score(
    record: &ScoreRecord,
    volatility: f64,
    now: DateTime<Utc>,
) -> Result<ValidatorScoreOutput, DecayError> {
    compute_validator_score_with(record, volatility, now, DEFAULT_SIGNAL_HALF_LIFE_HOURS)
}

/// [`compute_validator_score`] with the base half-life taken from `config`.
/// `volatility` falls back to the configured default when `None`.
pub fn compute_validator_score_from_config(
    record: &ScoreRecord,
    config: &ScoringConfig,
    volatility: Option<f64>,
    now: DateTime<Utc>,
) -> Result<ValidatorScoreOutput, DecayError> {
    compute_validator_score_with(
        record,
        volatility.unwrap_or(config.default_volatility),
        now,
        config.default_half_life_hours,
    )
}

/// [`compute_validator_score`] with an explicit base half-life in hours.
pub fn compute_validator_score_with(
    record: &ScoreRecord,
    volatility: f64,
    now: DateTime<Utc>,
    base_half_life_hours: f64,
) -> Result<ValidatorScoreOutput, DecayError> {
    let conviction = record.conviction;
    let half_life_hours =
        calculate_adjusted_half_life(base_half_life_hours, volatility, conviction);
    if !(half_life_hours > 0.0 && half_life_hours.is_finite()) {
        return Err(DecayError::InvalidHalfLife(half_life_hours * MINUTES_PER_HOUR));
    }

    let scored_at = record.scored_at_utc();
    let decayed_score = apply_time_decay(
        record.uwr_score,
        scored_at,
        now,
        half_life_hours * MINUTES_PER_HOUR,
    )?;

    let output = ValidatorScoreOutput {
        base_score: record.uwr_score,
        decayed_score,
        age_hours: age_hours(scored_at, now),
        half_life_hours,
        conviction,
        volatility,
    };

    debug!(
        strategy_id = %record.strategy_id,
        base_score = output.base_score,
        decayed_score = output.decayed_score,
        age_hours = output.age_hours,
        half_life_hours,
        "validator score computed"
    );

    Ok(output)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyst::context::SignalContext;
    use crate::analyst::score_record::tests::sample_fields;
    use crate::analyst::trend_pullback::tests::strong_setup;
    use crate::analyst::trend_pullback::TrendPullbackNormalizer;
    use crate::signals::weighted_score::WeightConfig;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn record(conviction: f64, uwr_score: f64) -> ScoreRecord {
        let mut fields = sample_fields();
        fields.conviction = conviction;
        fields.uwr_score = uwr_score;
        ScoreRecord::assemble(fields).unwrap()
    }

    #[test]
    fn fresh_record_keeps_base_score() {
        let r = record(1.0, 0.8);
        let out = compute_validator_score(&r, 1.0, r.scored_at_utc()).unwrap();
        assert_eq!(out.base_score, 0.8);
        assert_eq!(out.decayed_score, 0.8);
        assert_eq!(out.age_hours, 0.0);
        assert!((out.half_life_hours - 24.0).abs() < 1e-12);
    }

    #[test]
    fn one_default_half_life_halves_score() {
        let r = record(1.0, 0.8);
        let now = r.scored_at_utc() + Duration::hours(24);
        let out = compute_validator_score(&r, 1.0, now).unwrap();
        assert!((out.decayed_score - 0.4).abs() < 1e-9);
        assert!((out.age_hours - 24.0).abs() < 1e-9);
    }

    #[test]
    fn conviction_and_volatility_scale_half_life() {
        let r = record(0.5, 0.8);
        let out = compute_validator_score(&r, 2.0, r.scored_at_utc()).unwrap();
        assert!((out.half_life_hours - 6.0).abs() < 1e-12);

        let now = r.scored_at_utc() + Duration::hours(6);
        let out = compute_validator_score(&r, 2.0, now).unwrap();
        assert!((out.decayed_score - 0.4).abs() < 1e-9);
        assert_eq!(out.volatility, 2.0);
        assert_eq!(out.conviction, 0.5);
    }

    #[test]
    fn explicit_base_half_life() {
        let r = record(1.0, 0.6);
        let now = r.scored_at_utc() + Duration::hours(12);
        let out = compute_validator_score_with(&r, 1.0, now, 12.0).unwrap();
        assert!((out.decayed_score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn config_supplies_half_life_and_volatility() {
        let r = record(1.0, 0.8);
        let mut config = ScoringConfig::default();
        config.default_half_life_hours = 12.0;
        config.default_volatility = 2.0;

        let out =
            compute_validator_score_from_config(&r, &config, None, r.scored_at_utc()).unwrap();
        assert!((out.half_life_hours - 6.0).abs() < 1e-12);
        assert_eq!(out.volatility, 2.0);

        let now = r.scored_at_utc() + Duration::hours(12);
        let out = compute_validator_score_from_config(&r, &config, Some(1.0), now).unwrap();
        assert!((out.half_life_hours - 12.0).abs() < 1e-12);
        assert!((out.decayed_score - 0.4).abs() < 1e-9);

        let default = ScoringConfig::default();
        let out = compute_validator_score_from_config(&r, &default, None, now).unwrap();
        let direct = compute_validator_score(&r, 1.0, now).unwrap();
        assert_eq!(out, direct);
    }

    #[test]
    fn zero_scored_record_stays_scorable() {
        let scored_at = t0();
        let record = TrendPullbackNormalizer::default()
            .score(
                &strong_setup(),
                &SignalContext::new(scored_at),
                &WeightConfig::new(0.0, 0.0, 0.0, 0.0),
            )
            .unwrap();
        assert_eq!(record.uwr_score, 0.0);
        assert_eq!(record.conviction, 1.0);

        let out = compute_validator_score(&record, 1.0, scored_at + Duration::hours(1)).unwrap();
        assert_eq!(out.decayed_score, 0.0);
        assert!((out.half_life_hours - 24.0).abs() < 1e-12);
    }

    #[test]
    fn clock_skew_reports_negative_age_without_growth() {
        let r = record(1.0, 0.7);
        let now = r.scored_at_utc() - Duration::hours(2);
        let out = compute_validator_score(&r, 1.0, now).unwrap();
        assert!((out.age_hours + 2.0).abs() < 1e-9);
        assert_eq!(out.decayed_score, 0.7);
    }

    #[test]
    fn degenerate_half_life_is_rejected() {
        let r = record(0.0, 0.7);
        let now = r.scored_at_utc();
        assert!(matches!(
            compute_validator_score(&r, 1.0, now),
            Err(DecayError::InvalidHalfLife(_))
        ));

        let r = record(0.9, 0.7);
        assert!(compute_validator_score(&r, 0.0, now).is_err());
        assert!(compute_validator_score(&r, -1.0, now).is_err());
    }
}
