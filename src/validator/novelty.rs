// =============================================================================
// Novelty Result — Cohort-relative novelty envelope
// =============================================================================
//
// Novelty is metadata a validator attaches to its decision.  It never feeds
// back into the UWR score.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoveltyClass {
    Breakthrough,
    Incremental,
    Redundant,
    Contradictory,
}

impl std::fmt::Display for NoveltyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoveltyClass::Breakthrough => write!(f, "breakthrough"),
            NoveltyClass::Incremental => write!(f, "incremental"),
            NoveltyClass::Redundant => write!(f, "redundant"),
            NoveltyClass::Contradictory => write!(f, "contradictory"),
        }
    }
}

/// A prior signal the novelty comparison was made against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoveltyReferenceSignal {
    pub signal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_at_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoveltyResult {
    /// 1.0 is maximally novel against the baseline.
    pub novelty_score: f64,
    pub novelty_class: NoveltyClass,
    /// e.g. market + timeframe + strategy family.
    pub cohort_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_signals: Vec<NoveltyReferenceSignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    pub computed_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn novelty_wire_shape() {
        let json = r#"{
            "noveltyScore": 0.82,
            "noveltyClass": "incremental",
            "cohortId": "btc-perp-4h-v1",
            "referenceSignals": [{ "signalId": "ref-1", "label": "prior insight" }],
            "computedAt": "2025-01-01T00:00:00Z"
        }"#;
        let novelty: NoveltyResult = serde_json::from_str(json).unwrap();
        assert_eq!(novelty.novelty_class, NoveltyClass::Incremental);
        assert!((novelty.novelty_score - 0.82).abs() < 1e-12);
        assert_eq!(novelty.reference_signals[0].signal_id, "ref-1");
        assert!(novelty.flags.is_empty());

        let out = serde_json::to_value(&novelty).unwrap();
        assert!(out.get("baselineId").is_none());
        assert!(out.get("flags").is_none());
        assert_eq!(out["noveltyClass"], "incremental");
    }
}
