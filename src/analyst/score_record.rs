// =============================================================================
// Score Record — Canonical per-signal analyst scoring output
// =============================================================================
//
// `ScoreFields` is the plain, fully populated shape an analyst assembles.
// `ScoreRecord` is the only form that leaves assembly: it can only be built
// through validation (including when deserialised), and exposes its fields
// read-only.  Decay never mutates a record; it derives a new value from
// `uwrScore` and `scoredAt` at read time.
//
// The record carries no PoI / PoInsight reputation fields and no index-level
// execution multipliers.

use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DecayError, FieldIssue, ValidationError};
use crate::signals::decay_template::{pick_decay_params, DecayParams};
use crate::signals::signal_decay::{apply_time_decay, parse_iso8601};
use crate::signals::weighted_score::{Axis, UwrAxes};
use crate::types::{
    AssetClass, Direction, HoldingHorizon, InstrumentType, MarketType, OptionType, RiskBucket,
};

// =============================================================================
// Narrative / derivative sub-records
// =============================================================================

/// Option Greeks, mostly for derivatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vega: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rho: Option<f64>,
}

/// Per-axis explanations of the scoring rationale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisNotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

impl AxisNotes {
    pub fn get(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::Structure => self.structure.as_deref(),
            Axis::Execution => self.execution.as_deref(),
            Axis::Risk => self.risk.as_deref(),
            Axis::Insight => self.insight.as_deref(),
        }
    }

    pub fn set(&mut self, axis: Axis, note: impl Into<String>) {
        let slot = match axis {
            Axis::Structure => &mut self.structure,
            Axis::Execution => &mut self.execution,
            Axis::Risk => &mut self.risk,
            Axis::Insight => &mut self.insight,
        };
        *slot = Some(note.into());
    }

    pub fn is_empty(&self) -> bool {
        Axis::ALL.iter().all(|&a| self.get(a).is_none())
    }

    /// Notes in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &str)> {
        Axis::ALL
            .into_iter()
            .filter_map(move |a| self.get(a).map(|n| (a, n)))
    }
}

// =============================================================================
// ScoreFields
// =============================================================================

/// Every field of a score record, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFields {
    // ── Identity ────────────────────────────────────────────────────────
    pub analyst_id: String,
    pub strategy_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_version: Option<String>,

    // ── Market context ──────────────────────────────────────────────────
    pub market_type: MarketType,
    pub asset_class: AssetClass,
    pub instrument_type: InstrumentType,
    pub base_asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    /// Units per contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_size: Option<f64>,
    /// ISO-8601 expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,

    // ── Time / horizon ──────────────────────────────────────────────────
    /// e.g. "1m", "4h", "1d".
    pub signal_timeframe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_horizon: Option<HoldingHorizon>,
    /// ISO-8601 time of scoring.  Required for decay.
    pub scored_at: String,

    // ── Direction & risk ────────────────────────────────────────────────
    pub direction: Direction,
    pub risk_bucket: RiskBucket,
    pub conviction: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeks: Option<Greeks>,

    // ── UWR ─────────────────────────────────────────────────────────────
    pub uwr_axes: UwrAxes,
    pub uwr_score: f64,

    // ── Narrative ───────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_notes: Option<AxisNotes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub axis_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveats: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

fn check_unit_range(issues: &mut Vec<FieldIssue>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        issues.push(FieldIssue::new(
            field,
            format!("must be within [0, 1], got {value}"),
        ));
    }
}

fn check_non_empty(issues: &mut Vec<FieldIssue>, field: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(FieldIssue::new(field, "must not be empty"));
    }
}

fn check_positive(issues: &mut Vec<FieldIssue>, field: &str, value: Option<f64>) {
    if let Some(v) = value {
        if !(v > 0.0 && v.is_finite()) {
            issues.push(FieldIssue::new(field, format!("must be > 0, got {v}")));
        }
    }
}

impl ScoreFields {
    /// Check every schema constraint.  Returns the parsed `scoredAt` on
    /// success; otherwise every failing field.
    pub fn validate(&self) -> Result<DateTime<Utc>, ValidationError> {
        let mut issues = Vec::new();

        check_non_empty(&mut issues, "analystId", &self.analyst_id);
        check_non_empty(&mut issues, "strategyId", &self.strategy_id);
        check_non_empty(&mut issues, "baseAsset", &self.base_asset);
        check_non_empty(&mut issues, "signalTimeframe", &self.signal_timeframe);

        check_positive(&mut issues, "contractSize", self.contract_size);
        check_positive(&mut issues, "strike", self.strike);
        if let Some(expiry) = &self.expiry {
            if let Err(e) = parse_iso8601(expiry) {
                issues.push(FieldIssue::new("expiry", e.to_string()));
            }
        }

        check_unit_range(&mut issues, "conviction", self.conviction);
        for axis in Axis::ALL {
            let field = format!("uwrAxes.{axis}");
            check_unit_range(&mut issues, &field, self.uwr_axes.get(axis));
        }
        check_unit_range(&mut issues, "uwrScore", self.uwr_score);

        let scored_at = match parse_iso8601(&self.scored_at) {
            Ok(ts) => Some(ts),
            Err(DecayError::InvalidTimestamp { reason, .. }) => {
                issues.push(FieldIssue::new(
                    "scoredAt",
                    format!("not an ISO-8601 timestamp ({reason})"),
                ));
                None
            }
            Err(e) => {
                issues.push(FieldIssue::new("scoredAt", e.to_string()));
                None
            }
        };

        match scored_at {
            Some(ts) if issues.is_empty() => Ok(ts),
            _ => Err(ValidationError { issues }),
        }
    }
}

// =============================================================================
// ScoreRecord
// =============================================================================

/// A validated, immutable score record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScoreFields", into = "ScoreFields")]
pub struct ScoreRecord {
    fields: ScoreFields,
    scored_at_utc: DateTime<Utc>,
}

impl ScoreRecord {
    /// Validate `fields` and seal them into a record.
    ///
    /// # Errors
    /// A `ValidationError` naming every failing field.  The record is never
    /// emitted partially valid.
    pub fn assemble(fields: ScoreFields) -> Result<Self, ValidationError> {
        match fields.validate() {
            Ok(scored_at_utc) => {
                debug!(
                    analyst_id = %fields.analyst_id,
                    strategy_id = %fields.strategy_id,
                    uwr_score = fields.uwr_score,
                    "score record assembled"
                );
                Ok(Self {
                    fields,
                    scored_at_utc,
                })
            }
            Err(err) => {
                warn!(
                    analyst_id = %fields.analyst_id,
                    strategy_id = %fields.strategy_id,
                    failing_fields = ?err.fields(),
                    "score record rejected"
                );
                Err(err)
            }
        }
    }

    /// `scoredAt` as a UTC instant.
    pub fn scored_at_utc(&self) -> DateTime<Utc> {
        self.scored_at_utc
    }

    /// Decay parameters for this record's holding horizon.
    pub fn decay_params(&self) -> DecayParams {
        pick_decay_params(self.fields.holding_horizon)
    }

    /// `uwrScore` decayed to `now` with the horizon's half-life.
    pub fn decayed_score(&self, now: DateTime<Utc>) -> Result<f64, DecayError> {
        let params = self.decay_params();
        apply_time_decay(
            self.fields.uwr_score,
            self.scored_at_utc,
            now,
            params.half_life_minutes,
        )
    }

    /// Give up the validated fields, e.g. to derive an amended record that
    /// must be assembled again.
    pub fn into_fields(self) -> ScoreFields {
        self.fields
    }
}

impl Deref for ScoreRecord {
    type Target = ScoreFields;

    fn deref(&self) -> &ScoreFields {
        &self.fields
    }
}

impl TryFrom<ScoreFields> for ScoreRecord {
    type Error = ValidationError;

    fn try_from(fields: ScoreFields) -> Result<Self, Self::Error> {
        Self::assemble(fields)
    }
}

impl From<ScoreRecord> for ScoreFields {
    fn from(record: ScoreRecord) -> Self {
        record.fields
    }
}

// =============================================================================
// Assembly helpers
// =============================================================================

/// Split a `BASE/QUOTE` symbol, substituting defaults for missing parts.
pub fn split_symbol(
    symbol: Option<&str>,
    default_base: &str,
    default_quote: &str,
) -> (String, String) {
    let mut parts = symbol.unwrap_or_default().split('/').map(str::trim);
    let base = parts
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(default_base);
    let quote = parts
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(default_quote);
    (base.to_string(), quote.to_string())
}
