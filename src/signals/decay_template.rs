// =============================================================================
// Greeks Decay Templates — Horizon-specific decay profiles
// =============================================================================
//
// Each holding horizon carries a decay template.  The half-lives in this
// table are protocol surface: two implementations that disagree on them
// desynchronise every score derived from a holding horizon.
//
//   horizon    template id          half-life (min)
//   scalp      decay-scalp-v1       8
//   intraday   decay-intraday-v1    60
//   swing      decay-swing-v1       720
//   position   decay-position-v1    5040
//
// Lookup folds `long-term` onto `position`; unknown or missing horizons fall
// back to `swing`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DecayError, FieldIssue, ValidationError};
use crate::signals::signal_decay::{apply_time_decay, elapsed_minutes};
use crate::signals::weighted_score::clamp01;
use crate::types::HoldingHorizon;

// =============================================================================
// Types
// =============================================================================

/// Horizons that own a concrete decay template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayHorizon {
    Scalp,
    Intraday,
    Swing,
    Position,
}

impl DecayHorizon {
    pub const ALL: [DecayHorizon; 4] = [
        DecayHorizon::Scalp,
        DecayHorizon::Intraday,
        DecayHorizon::Swing,
        DecayHorizon::Position,
    ];

    /// Fold an analyst-reported horizon onto a template horizon.
    pub fn resolve(horizon: Option<HoldingHorizon>) -> Self {
        match horizon {
            Some(HoldingHorizon::Scalp) => Self::Scalp,
            Some(HoldingHorizon::Intraday) => Self::Intraday,
            Some(HoldingHorizon::Swing) => Self::Swing,
            Some(HoldingHorizon::Position) | Some(HoldingHorizon::LongTerm) => Self::Position,
            Some(HoldingHorizon::Unknown) | None => Self::Swing,
        }
    }
}

/// Shape of the decay curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayModel {
    /// Exponential half-life decay.
    Exp,
    /// Constant rate: half gone at one half-life, all gone at two.
    Linear,
    /// Full value until `max_life_minutes`, then zero.
    Cliff,
}

/// Decay profile for one holding horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreeksDecayTemplate {
    pub template_id: String,
    pub horizon_label: DecayHorizon,
    /// Expected mean time in trade.
    pub target_holding_minutes: f64,
    /// Hard cut-off after which the signal is no longer valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_life_minutes: Option<f64>,
    pub decay_model: DecayModel,
    /// Required for `Exp` and `Linear`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_life_minutes: Option<f64>,
    /// How aggressively to bleed score, 0 (conservative) to 1 (aggressive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theta_bias: Option<f64>,
    /// Event time for event-style signals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Minimal decay parameters attached to a scored signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayParams {
    pub half_life_minutes: f64,
    pub template_id: String,
}

// =============================================================================
// Default table
// =============================================================================

fn template(
    id: &str,
    horizon: DecayHorizon,
    target: f64,
    max_life: f64,
    half_life: f64,
    theta_bias: f64,
    note: &str,
) -> GreeksDecayTemplate {
    GreeksDecayTemplate {
        template_id: id.to_string(),
        horizon_label: horizon,
        target_holding_minutes: target,
        max_life_minutes: Some(max_life),
        decay_model: DecayModel::Exp,
        half_life_minutes: Some(half_life),
        theta_bias: Some(theta_bias),
        event_time_iso: None,
        notes: vec![note.to_string()],
    }
}

/// Protocol default template for a horizon.
pub fn default_template(horizon: DecayHorizon) -> GreeksDecayTemplate {
    match horizon {
        DecayHorizon::Scalp => template(
            "decay-scalp-v1",
            horizon,
            10.0,
            30.0,
            8.0,
            0.8,
            "Fast decay for scalp trades (seconds to minutes)",
        ),
        DecayHorizon::Intraday => template(
            "decay-intraday-v1",
            horizon,
            90.0,
            360.0,
            60.0,
            0.6,
            "Moderate decay for intraday trades (minutes to hours)",
        ),
        DecayHorizon::Swing => template(
            "decay-swing-v1",
            horizon,
            1440.0,
            4320.0,
            720.0,
            0.4,
            "Slower decay for swing trades (hours to days)",
        ),
        DecayHorizon::Position => template(
            "decay-position-v1",
            horizon,
            10080.0,
            43200.0,
            5040.0,
            0.2,
            "Very slow decay for position trades (days to weeks)",
        ),
    }
}

/// All four default templates in horizon order.
pub fn default_templates() -> Vec<GreeksDecayTemplate> {
    DecayHorizon::ALL.iter().map(|&h| default_template(h)).collect()
}

impl GreeksDecayTemplate {
    /// Half-life in minutes, falling back to half the target holding time.
    pub fn effective_half_life(&self) -> f64 {
        self.half_life_minutes
            .unwrap_or(self.target_holding_minutes / 2.0)
    }

    pub fn decay_params(&self) -> DecayParams {
        DecayParams {
            half_life_minutes: self.effective_half_life(),
            template_id: self.template_id.clone(),
        }
    }

    /// Check the template's structural constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.template_id.trim().is_empty() {
            issues.push(FieldIssue::new("templateId", "must not be empty"));
        }
        if !(self.target_holding_minutes > 0.0) {
            issues.push(FieldIssue::new(
                "targetHoldingMinutes",
                format!("must be > 0, got {}", self.target_holding_minutes),
            ));
        }
        if let Some(max_life) = self.max_life_minutes {
            if !(max_life > 0.0) {
                issues.push(FieldIssue::new(
                    "maxLifeMinutes",
                    format!("must be > 0, got {max_life}"),
                ));
            }
        }
        match self.half_life_minutes {
            Some(h) if !(h > 0.0) => issues.push(FieldIssue::new(
                "halfLifeMinutes",
                format!("must be > 0, got {h}"),
            )),
            None if matches!(self.decay_model, DecayModel::Exp | DecayModel::Linear) => {
                issues.push(FieldIssue::new(
                    "halfLifeMinutes",
                    "is required for exp and linear decay models",
                ))
            }
            _ => {}
        }
        if self.decay_model == DecayModel::Cliff && self.max_life_minutes.is_none() {
            issues.push(FieldIssue::new(
                "maxLifeMinutes",
                "is required for the cliff decay model",
            ));
        }
        if let Some(theta) = self.theta_bias {
            if !(0.0..=1.0).contains(&theta) {
                issues.push(FieldIssue::new(
                    "thetaBias",
                    format!("must be within [0, 1], got {theta}"),
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

// =============================================================================
// Lookup & application
// =============================================================================

/// Decay parameters for an analyst-reported holding horizon.
pub fn pick_decay_params(horizon: Option<HoldingHorizon>) -> DecayParams {
    let resolved = DecayHorizon::resolve(horizon);
    let params = default_template(resolved).decay_params();
    debug!(
        requested = ?horizon,
        resolved = ?resolved,
        half_life_minutes = params.half_life_minutes,
        "decay params picked"
    );
    params
}

/// Decay `base_score` following a template's decay model.
pub fn apply_template_decay(
    base_score: f64,
    scored_at: DateTime<Utc>,
    now: DateTime<Utc>,
    template: &GreeksDecayTemplate,
) -> Result<f64, DecayError> {
    let elapsed = elapsed_minutes(scored_at, now);
    match template.decay_model {
        DecayModel::Exp => {
            apply_time_decay(base_score, scored_at, now, template.effective_half_life())
        }
        DecayModel::Linear => {
            let half_life = template.effective_half_life();
            if !(half_life > 0.0) {
                return Err(DecayError::InvalidHalfLife(half_life));
            }
            let base = clamp01(base_score);
            let remaining = (1.0 - elapsed / (2.0 * half_life)).max(0.0);
            Ok(base * remaining)
        }
        DecayModel::Cliff => {
            let base = clamp01(base_score);
            match template.max_life_minutes {
                Some(max_life) if elapsed >= max_life => Ok(0.0),
                _ => Ok(base),
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn horizon_table_matches_protocol() {
        let expected = [
            (HoldingHorizon::Scalp, 8.0, "decay-scalp-v1"),
            (HoldingHorizon::Intraday, 60.0, "decay-intraday-v1"),
            (HoldingHorizon::Swing, 720.0, "decay-swing-v1"),
            (HoldingHorizon::Position, 5040.0, "decay-position-v1"),
        ];
        for (horizon, half_life, id) in expected {
            let params = pick_decay_params(Some(horizon));
            assert_eq!(params.half_life_minutes, half_life);
            assert_eq!(params.template_id, id);
        }
    }

    #[test]
    fn long_term_aliases_position() {
        assert_eq!(
            pick_decay_params(Some(HoldingHorizon::LongTerm)),
            pick_decay_params(Some(HoldingHorizon::Position))
        );
        assert_eq!(pick_decay_params(Some(HoldingHorizon::LongTerm)).half_life_minutes, 5040.0);
    }

    #[test]
    fn unknown_or_missing_falls_back_to_swing() {
        assert_eq!(pick_decay_params(None).half_life_minutes, 720.0);
        assert_eq!(
            pick_decay_params(Some(HoldingHorizon::Unknown)).template_id,
            "decay-swing-v1"
        );
        let nonsense = HoldingHorizon::from_label("nonsense");
        assert_eq!(pick_decay_params(Some(nonsense)).half_life_minutes, 720.0);
    }

    #[test]
    fn default_templates_are_valid() {
        let templates = default_templates();
        assert_eq!(templates.len(), 4);
        for t in &templates {
            assert!(t.validate().is_ok(), "{} invalid", t.template_id);
        }
    }

    #[test]
    fn half_life_falls_back_to_half_target() {
        let mut t = default_template(DecayHorizon::Swing);
        t.half_life_minutes = None;
        t.decay_model = DecayModel::Cliff;
        assert_eq!(t.decay_params().half_life_minutes, 720.0);
    }

    #[test]
    fn validation_rejects_bad_templates() {
        let mut t = default_template(DecayHorizon::Scalp);
        t.template_id = String::new();
        t.half_life_minutes = None;
        t.theta_bias = Some(1.4);
        let err = t.validate().unwrap_err();
        assert!(err.has_field("templateId"));
        assert!(err.has_field("halfLifeMinutes"));
        assert!(err.has_field("thetaBias"));

        let mut cliff = default_template(DecayHorizon::Intraday);
        cliff.decay_model = DecayModel::Cliff;
        cliff.max_life_minutes = None;
        assert!(cliff.validate().unwrap_err().has_field("maxLifeMinutes"));
    }

    #[test]
    fn template_wire_shape() {
        let json = serde_json::to_value(default_template(DecayHorizon::Position)).unwrap();
        assert_eq!(json["templateId"], "decay-position-v1");
        assert_eq!(json["horizonLabel"], "position");
        assert_eq!(json["decayModel"], "exp");
        assert_eq!(json["halfLifeMinutes"], 5040.0);
        assert!(json.get("eventTimeIso").is_none());
    }

    #[test]
    fn exp_template_uses_half_life() {
        let t = default_template(DecayHorizon::Intraday);
        let decayed = apply_template_decay(0.8, t0(), t0() + Duration::minutes(60), &t).unwrap();
        assert!((decayed - 0.4).abs() < 1e-12);
    }

    #[test]
    fn linear_template_reaches_zero_at_two_half_lives() {
        let mut t = default_template(DecayHorizon::Intraday);
        t.decay_model = DecayModel::Linear;
        let half = apply_template_decay(1.0, t0(), t0() + Duration::minutes(60), &t).unwrap();
        assert!((half - 0.5).abs() < 1e-12);
        let gone = apply_template_decay(1.0, t0(), t0() + Duration::minutes(150), &t).unwrap();
        assert_eq!(gone, 0.0);
    }

    #[test]
    fn cliff_template_cuts_off_at_max_life() {
        let mut t = default_template(DecayHorizon::Scalp);
        t.decay_model = DecayModel::Cliff;
        let before = apply_template_decay(0.7, t0(), t0() + Duration::minutes(29), &t).unwrap();
        let after = apply_template_decay(0.7, t0(), t0() + Duration::minutes(30), &t).unwrap();
        assert_eq!(before, 0.7);
        assert_eq!(after, 0.0);
    }
}
