// =============================================================================
// Validator Decision — Auditable record of every validator verdict
// =============================================================================
//
// A validator's verdict on one signal, captured for audit and replay.  The
// decision kind comes from the caller: approval policy lives outside the
// scoring core, which only supplies the numbers the policy looked at.
//
// Decisions are append-only.  `DecisionLog` stamps each with an id and entry
// time and hands out shared references only.
// =============================================================================

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::signals::weighted_score::clamp01;
use crate::validator::novelty::NoveltyResult;
use crate::validator::score::ValidatorScoreOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorDecisionKind {
    Approve,
    Reject,
    Flag,
    Abstain,
}

impl std::fmt::Display for ValidatorDecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidatorDecisionKind::Approve => write!(f, "approve"),
            ValidatorDecisionKind::Reject => write!(f, "reject"),
            ValidatorDecisionKind::Flag => write!(f, "flag"),
            ValidatorDecisionKind::Abstain => write!(f, "abstain"),
        }
    }
}

/// One validator's decision on one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorDecision {
    pub signal_id: String,

    /// Agent, droid or human producing the decision.
    pub validator_id: String,

    pub decision: ValidatorDecisionKind,

    /// UWR-derived confidence in [0, 1].
    pub uwr_confidence: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decayed_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_hours: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regime_tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub novelty: Option<NoveltyResult>,

    /// Machine-readable tags, e.g. "low-novelty".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_codes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// ISO 8601 timestamp of when this decision was created.
    pub created_at: String,
}

impl ValidatorDecision {
    pub fn new(
        signal_id: impl Into<String>,
        validator_id: impl Into<String>,
        decision: ValidatorDecisionKind,
        uwr_confidence: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            signal_id: signal_id.into(),
            validator_id: validator_id.into(),
            decision,
            uwr_confidence: clamp01(uwr_confidence),
            decayed_score: None,
            age_hours: None,
            regime_tag: None,
            novelty: None,
            reason_codes: Vec::new(),
            notes: None,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Decision backed by a computed validator score.  Confidence is the
    /// undecayed UWR score; the decayed score and age ride along.
    pub fn from_score(
        signal_id: impl Into<String>,
        validator_id: impl Into<String>,
        decision: ValidatorDecisionKind,
        score: &ValidatorScoreOutput,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut d = Self::new(signal_id, validator_id, decision, score.base_score, created_at);
        d.decayed_score = Some(score.decayed_score);
        d.age_hours = Some(score.age_hours);
        d
    }

    pub fn with_regime_tag(mut self, tag: impl Into<String>) -> Self {
        self.regime_tag = Some(tag.into());
        self
    }

    pub fn with_novelty(mut self, novelty: NoveltyResult) -> Self {
        self.novelty = Some(novelty);
        self
    }

    pub fn with_reason_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reason_codes.extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Envelope downstream mint / replay logic consumes.  Shape only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorOutcome {
    pub mint_eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay_session_id: Option<String>,
    pub decision: ValidatorDecision,
}

// =============================================================================
// Decision log
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedDecision {
    /// UUID v4.
    pub id: String,
    pub recorded_at: DateTime<Utc>,
    pub decision: ValidatorDecision,
}

/// Append-only in-memory audit log.
#[derive(Debug, Clone, Default)]
pub struct DecisionLog {
    entries: Vec<LoggedDecision>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `decision` and return its entry.
    pub fn append(
        &mut self,
        decision: ValidatorDecision,
        recorded_at: DateTime<Utc>,
    ) -> &LoggedDecision {
        let id = uuid::Uuid::new_v4().to_string();
        info!(
            id = %id,
            signal_id = %decision.signal_id,
            validator_id = %decision.validator_id,
            decision = %decision.decision,
            uwr_confidence = decision.uwr_confidence,
            "validator decision recorded"
        );
        let index = self.entries.len();
        self.entries.push(LoggedDecision {
            id,
            recorded_at,
            decision,
        });
        &self.entries[index]
    }

    /// Every entry in insertion order.
    pub fn entries(&self) -> &[LoggedDecision] {
        &self.entries
    }

    /// Entries for one signal, in insertion order.
    pub fn for_signal<'a>(
        &'a self,
        signal_id: &'a str,
    ) -> impl Iterator<Item = &'a LoggedDecision> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.decision.signal_id == signal_id)
    }

    pub fn latest_for_signal(&self, signal_id: &str) -> Option<&LoggedDecision> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.decision.signal_id == signal_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::novelty::NoveltyClass;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn decision_wire_shape() {
        let novelty = NoveltyResult {
            novelty_score: 0.82,
            novelty_class: NoveltyClass::Incremental,
            cohort_id: "btc-perp-4h-v1".into(),
            baseline_id: None,
            reference_signals: Vec::new(),
            evidence_notes: None,
            flags: Vec::new(),
            computed_at: "2025-03-01T12:00:00Z".into(),
        };
        let d = ValidatorDecision::new(
            "signal-123",
            "validator-xyz",
            ValidatorDecisionKind::Approve,
            0.91,
            t0(),
        )
        .with_regime_tag("expansion")
        .with_novelty(novelty)
        .with_reason_codes(["high-quality", "novelty-ok"])
        .with_notes("Solid insight with acceptable novelty.");

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["decision"], "approve");
        assert_eq!(json["signalId"], "signal-123");
        assert_eq!(json["createdAt"], "2025-03-01T12:00:00.000Z");
        assert_eq!(json["reasonCodes"][1], "novelty-ok");
        assert_eq!(json["novelty"]["noveltyClass"], "incremental");
        assert!(json.get("decayedScore").is_none());

        let back: ValidatorDecision = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn confidence_is_clamped() {
        let d = ValidatorDecision::new("s", "v", ValidatorDecisionKind::Flag, 1.4, t0());
        assert_eq!(d.uwr_confidence, 1.0);
        let d = ValidatorDecision::new("s", "v", ValidatorDecisionKind::Flag, f64::NAN, t0());
        assert_eq!(d.uwr_confidence, 0.0);
    }

    #[test]
    fn from_score_carries_decay_numbers() {
        let score = ValidatorScoreOutput {
            base_score: 0.8,
            decayed_score: 0.4,
            age_hours: 24.0,
            half_life_hours: 24.0,
            conviction: 1.0,
            volatility: 1.0,
        };
        let d = ValidatorDecision::from_score("s", "v", ValidatorDecisionKind::Flag, &score, t0());
        assert_eq!(d.uwr_confidence, 0.8);
        assert_eq!(d.decayed_score, Some(0.4));
        assert_eq!(d.age_hours, Some(24.0));
    }

    #[test]
    fn outcome_wraps_decision() {
        let outcome = ValidatorOutcome {
            mint_eligible: false,
            mint_reason: Some("needs-review".into()),
            replay_session_id: Some("replay-001".into()),
            decision: ValidatorDecision::new("s", "v", ValidatorDecisionKind::Flag, 0.4, t0()),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["mintEligible"], false);
        assert_eq!(json["replaySessionId"], "replay-001");
        assert_eq!(json["decision"]["decision"], "flag");
    }

    #[test]
    fn log_is_append_only_and_ordered() {
        let mut log = DecisionLog::new();
        assert!(log.is_empty());

        let first_id = log
            .append(
                ValidatorDecision::new("a", "v1", ValidatorDecisionKind::Flag, 0.5, t0()),
                t0(),
            )
            .id
            .clone();
        log.append(
            ValidatorDecision::new("b", "v1", ValidatorDecisionKind::Reject, 0.2, t0()),
            t0() + Duration::minutes(1),
        );
        log.append(
            ValidatorDecision::new("a", "v2", ValidatorDecisionKind::Approve, 0.7, t0()),
            t0() + Duration::minutes(2),
        );

        assert_eq!(log.len(), 3);
        let for_a: Vec<_> = log.for_signal("a").collect();
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].id, first_id);
        assert_eq!(for_a[1].decision.validator_id, "v2");
        assert_eq!(
            log.latest_for_signal("a").map(|e| e.decision.decision),
            Some(ValidatorDecisionKind::Approve)
        );
        assert!(log.latest_for_signal("zzz").is_none());
        assert_ne!(log.entries()[0].id, log.entries()[1].id);
    }
}
