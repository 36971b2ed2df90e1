// =============================================================================
// Universal Weighting Rule — Canonical four-axis signal aggregation
// =============================================================================
//
// Every analyst strategy and every validator routes through
// `compute_uwr_score` so that scores are comparable across strategies:
//
//   uwr = sum(clamp01(axis_i) * w_i) / sum(w_i)      (0 when sum(w_i) == 0)
//
// The rule runs on the scoring hot path and never fails.  NaN or
// out-of-range axes are clamped into [0, 1]; negative, NaN or infinite
// weights are treated as 0.  Reputation and novelty never feed into it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Clamp into [0, 1], mapping NaN to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// =============================================================================
// Types
// =============================================================================

/// One of the four quality axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// HTF alignment, value-line adherence, liquidity quality.
    Structure,
    /// Entry timing, trigger pattern, volatility regime fit.
    Execution,
    /// Risk/reward, stop and target placement.
    Risk,
    /// Asymmetry, originality, non-trivial edge.
    Insight,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::Structure, Axis::Execution, Axis::Risk, Axis::Insight];

    /// Wire name of the axis.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Execution => "execution",
            Self::Risk => "risk",
            Self::Insight => "insight",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized axis values produced by an axis normalizer.
///
/// Producers should pre-clamp; the aggregator clamps regardless.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UwrAxes {
    pub structure: f64,
    pub execution: f64,
    pub risk: f64,
    pub insight: f64,
}

impl UwrAxes {
    pub fn new(structure: f64, execution: f64, risk: f64, insight: f64) -> Self {
        Self {
            structure,
            execution,
            risk,
            insight,
        }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Structure => self.structure,
            Axis::Execution => self.execution,
            Axis::Risk => self.risk,
            Axis::Insight => self.insight,
        }
    }

    /// Copy with every axis clamped into [0, 1].
    pub fn clamped(&self) -> Self {
        Self {
            structure: clamp01(self.structure),
            execution: clamp01(self.execution),
            risk: clamp01(self.risk),
            insight: clamp01(self.insight),
        }
    }
}

/// Governance-supplied weights.  Need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightConfig {
    /// Optional version or identifier of this weight set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub structure_weight: f64,
    pub execution_weight: f64,
    pub risk_weight: f64,
    pub insight_weight: f64,
}

/// Identifier of the placeholder equal-weight configuration.
pub const DEFAULT_UWR_CONFIG_ID: &str = "uwr-default-stub";

impl Default for WeightConfig {
    /// Equal weights.  A placeholder until governance-approved weights are
    /// supplied.
    fn default() -> Self {
        Self {
            id: Some(DEFAULT_UWR_CONFIG_ID.to_string()),
            structure_weight: 0.25,
            execution_weight: 0.25,
            risk_weight: 0.25,
            insight_weight: 0.25,
        }
    }
}

impl WeightConfig {
    pub fn new(structure: f64, execution: f64, risk: f64, insight: f64) -> Self {
        Self {
            id: None,
            structure_weight: structure,
            execution_weight: execution,
            risk_weight: risk,
            insight_weight: insight,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Raw weight as configured.
    pub fn weight(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Structure => self.structure_weight,
            Axis::Execution => self.execution_weight,
            Axis::Risk => self.risk_weight,
            Axis::Insight => self.insight_weight,
        }
    }

    /// Weight as used by the aggregator: negative and non-finite become 0.
    pub fn effective_weight(&self, axis: Axis) -> f64 {
        sanitize_weight(self.weight(axis))
    }

    pub fn total_weight(&self) -> f64 {
        Axis::ALL.iter().map(|&a| self.effective_weight(a)).sum()
    }

    /// Effective weights divided by their total, in axis order.  All zero
    /// when the total is 0.
    ///
    /// Weights are rescaled by the largest one first, so the total cannot
    /// overflow even for weights near `f64::MAX`.
    pub fn normalized_weights(&self) -> [f64; 4] {
        let raw = Axis::ALL.map(|a| self.effective_weight(a));
        let max = raw.iter().copied().fold(0.0, f64::max);
        if max == 0.0 {
            return [0.0; 4];
        }
        let scaled = raw.map(|w| w / max);
        // At least 1.0: the largest weight scales to exactly 1.
        let total: f64 = scaled.iter().sum();
        scaled.map(|w| w / total)
    }

    /// True when every configured weight is finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        Axis::ALL
            .iter()
            .all(|&a| self.weight(a).is_finite() && self.weight(a) >= 0.0)
    }
}

fn sanitize_weight(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Compute the UWR score of `axes` under `weights`.
///
/// Result lies in [0, 1].  Returns 0 when the total effective weight is 0.
pub fn compute_uwr_score(axes: &UwrAxes, weights: &WeightConfig) -> f64 {
    if !weights.is_well_formed() {
        warn!(config_id = ?weights.id, "malformed UWR weights coerced to 0");
    }

    let clamped = axes.clamped();
    let shares = weights.normalized_weights();
    if shares.iter().all(|&s| s == 0.0) {
        return 0.0;
    }

    let weighted_sum: f64 = Axis::ALL
        .iter()
        .zip(shares)
        .map(|(&a, share)| clamped.get(a) * share)
        .sum();

    // A convex combination stays in range; clamp covers rounding only.
    let score = clamp01(weighted_sum);
    debug!(
        config_id = ?weights.id,
        structure = clamped.structure,
        execution = clamped.execution,
        risk = clamped.risk,
        insight = clamped.insight,
        score,
        "UWR score computed"
    );
    score
}

/// Contribution of one axis to a UWR score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisContribution {
    pub axis: Axis,
    /// Axis value after clamping.
    pub value: f64,
    /// Effective (sanitized) weight.
    pub weight: f64,
    /// Weight divided by total weight (0 when the total is 0).
    pub normalized_weight: f64,
    /// `value * normalized_weight`.
    pub contribution: f64,
}

/// Auditable breakdown of a UWR score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UwrBreakdown {
    pub score: f64,
    pub total_weight: f64,
    pub contributions: Vec<AxisContribution>,
}

/// Compute the UWR score along with each axis' contribution to it.
///
/// `score` is always exactly `compute_uwr_score(axes, weights)`.
pub fn explain_uwr_score(axes: &UwrAxes, weights: &WeightConfig) -> UwrBreakdown {
    let clamped = axes.clamped();
    let total_weight = weights.total_weight();
    let shares = weights.normalized_weights();

    let contributions = Axis::ALL
        .iter()
        .zip(shares)
        .map(|(&axis, normalized_weight)| {
            let value = clamped.get(axis);
            let weight = weights.effective_weight(axis);
            AxisContribution {
                axis,
                value,
                weight,
                normalized_weight,
                contribution: value * normalized_weight,
            }
        })
        .collect();

    UwrBreakdown {
        score: compute_uwr_score(axes, weights),
        total_weight,
        contributions,
    }
}
