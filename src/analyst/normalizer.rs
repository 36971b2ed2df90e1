// =============================================================================
// Axis Normalizers — Strategy-owned mapping onto the four UWR axes
// =============================================================================
//
// Each analyst strategy owns a normalizer that turns its raw attributes into
// `UwrAxes`.  Normalizers are pure: identical input gives identical output
// and every axis is clamped into [0, 1].
//
// Dispatch by strategy id goes through an explicitly constructed
// `NormalizerRegistry` that callers own and pass around.  There is no global
// registry.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::analyst::score_record::AxisNotes;
use crate::analyst::trend_pullback::TrendPullbackNormalizer;
use crate::error::ScoringError;
use crate::scoring_config::ScoringConfig;
use crate::signals::weighted_score::{compute_uwr_score, Axis, UwrAxes, WeightConfig};

/// Axis values plus explanations for weak axes.
///
/// Notes are supplementary and never feed into any score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedAxes {
    pub axes: UwrAxes,
    pub notes: AxisNotes,
}

impl NormalizedAxes {
    /// Axes scoring below `threshold`, in axis order.
    pub fn weak_axes(&self, threshold: f64) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|&a| self.axes.get(a) < threshold)
            .collect()
    }
}

/// Maps one strategy's raw input onto the UWR axes.
pub trait AxisNormalizer: Send + Sync {
    /// Strategy-defined raw input.
    type Input: DeserializeOwned;

    /// Identifier this normalizer is registered under.
    fn strategy_id(&self) -> &str;

    /// Normalize `input`.  Must be total and deterministic, and must clamp
    /// every axis into [0, 1].
    fn normalize(&self, input: &Self::Input) -> NormalizedAxes;
}

type DynNormalizer =
    Box<dyn Fn(&serde_json::Value) -> Result<NormalizedAxes, ScoringError> + Send + Sync>;

/// Strategy id → normalizer over raw JSON input.
#[derive(Default)]
pub struct NormalizerRegistry {
    normalizers: HashMap<String, DynNormalizer>,
}

impl NormalizerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in strategies with default parameters.
    pub fn with_defaults() -> Self {
        Self::from_config(&ScoringConfig::default())
    }

    /// A registry holding the built-in strategies parameterised by `config`.
    pub fn from_config(config: &ScoringConfig) -> Self {
        let mut registry = Self::new();
        registry.register(TrendPullbackNormalizer::new(
            config.trend_pullback.clone(),
            config.low_axis_threshold,
        ));
        registry
    }

    /// Register `normalizer` under its strategy id.  Returns `true` if it
    /// replaced an existing registration.
    pub fn register<N>(&mut self, normalizer: N) -> bool
    where
        N: AxisNormalizer + 'static,
    {
        let strategy_id = normalizer.strategy_id().to_string();
        let key = strategy_id.clone();
        let dispatch: DynNormalizer = Box::new(move |raw: &serde_json::Value| {
            let input = N::Input::deserialize(raw).map_err(|source| {
                ScoringError::MalformedInput {
                    strategy_id: strategy_id.clone(),
                    source,
                }
            })?;
            Ok(normalizer.normalize(&input))
        });
        self.normalizers.insert(key, dispatch).is_some()
    }

    pub fn contains(&self, strategy_id: &str) -> bool {
        self.normalizers.contains_key(strategy_id)
    }

    /// Registered strategy ids, sorted.
    pub fn strategy_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.normalizers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Normalize raw input with the strategy registered under `strategy_id`.
    pub fn normalize(
        &self,
        strategy_id: &str,
        raw: &serde_json::Value,
    ) -> Result<NormalizedAxes, ScoringError> {
        let normalizer = self
            .normalizers
            .get(strategy_id)
            .ok_or_else(|| ScoringError::UnknownStrategy(strategy_id.to_string()))?;
        let normalized = normalizer(raw)?;
        debug!(
            strategy_id,
            structure = normalized.axes.structure,
            execution = normalized.axes.execution,
            risk = normalized.axes.risk,
            insight = normalized.axes.insight,
            "axes normalized"
        );
        Ok(normalized)
    }

    /// Normalize and aggregate in one step.
    pub fn score(
        &self,
        strategy_id: &str,
        raw: &serde_json::Value,
        weights: &WeightConfig,
    ) -> Result<(NormalizedAxes, f64), ScoringError> {
        let normalized = self.normalize(strategy_id, raw)?;
        let score = compute_uwr_score(&normalized.axes, weights);
        Ok((normalized, score))
    }
}

impl std::fmt::Debug for NormalizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizerRegistry")
            .field("strategies", &self.strategy_ids())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Scores a single boolean into every axis.
    struct FlagNormalizer;

    #[derive(Deserialize)]
    struct FlagInput {
        good: bool,
    }

    impl AxisNormalizer for FlagNormalizer {
        type Input = FlagInput;

        fn strategy_id(&self) -> &str {
            "flag_v1"
        }

        fn normalize(&self, input: &FlagInput) -> NormalizedAxes {
            let v = if input.good { 1.0 } else { 0.0 };
            NormalizedAxes {
                axes: UwrAxes::new(v, v, v, v),
                notes: AxisNotes::default(),
            }
        }
    }

    #[test]
    fn defaults_register_trend_pullback() {
        let registry = NormalizerRegistry::with_defaults();
        assert!(registry.contains("trend_pullback_v1"));
        assert_eq!(registry.strategy_ids(), vec!["trend_pullback_v1"]);
    }

    #[test]
    fn dispatches_by_strategy_id() {
        let mut registry = NormalizerRegistry::new();
        assert!(!registry.register(FlagNormalizer));
        assert!(registry.register(FlagNormalizer));

        let (normalized, score) = registry
            .score("flag_v1", &json!({ "good": true }), &WeightConfig::default())
            .unwrap();
        assert_eq!(normalized.axes, UwrAxes::new(1.0, 1.0, 1.0, 1.0));
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        let registry = NormalizerRegistry::new();
        let err = registry.normalize("mean_reversion_v2", &json!({})).unwrap_err();
        assert!(matches!(err, ScoringError::UnknownStrategy(id) if id == "mean_reversion_v2"));
    }

    #[test]
    fn malformed_input_names_the_strategy() {
        let mut registry = NormalizerRegistry::new();
        registry.register(FlagNormalizer);
        let err = registry.normalize("flag_v1", &json!({ "good": "yes" })).unwrap_err();
        match err {
            ScoringError::MalformedInput { strategy_id, .. } => assert_eq!(strategy_id, "flag_v1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn weak_axes_below_threshold() {
        let normalized = NormalizedAxes {
            axes: UwrAxes::new(0.39, 0.4, 0.1, 0.9),
            notes: AxisNotes::default(),
        };
        assert_eq!(normalized.weak_axes(0.4), vec![Axis::Structure, Axis::Risk]);
    }
}
