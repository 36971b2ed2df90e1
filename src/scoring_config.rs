// =============================================================================
// Scoring Configuration — Governance-supplied weights and tunables
// =============================================================================
//
// UWR weights come from governance and are treated as external config: the
// core reads them and never mutates them.  Bucket boundaries and strategy
// thresholds live here too, so they can be tuned without touching protocol
// math.
//
// Persistence uses an atomic tmp + rename write.  All fields carry
// `#[serde(default)]` so a partial file still loads.
//
// =============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyst::trend_pullback::TrendPullbackParams;
use crate::signals::signal_decay::{DEFAULT_SIGNAL_HALF_LIFE_HOURS, NEUTRAL_FACTOR};
use crate::signals::weighted_score::{Axis, WeightConfig};

/// Axes below this value get an explanatory note.
pub const DEFAULT_LOW_AXIS_THRESHOLD: f64 = 0.4;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_half_life_hours() -> f64 {
    DEFAULT_SIGNAL_HALF_LIFE_HOURS
}

fn default_volatility() -> f64 {
    NEUTRAL_FACTOR
}

fn default_low_axis_threshold() -> f64 {
    DEFAULT_LOW_AXIS_THRESHOLD
}

// =============================================================================
// ScoringConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// UWR weights.  Equal weights when absent.
    #[serde(default)]
    pub weights: WeightConfig,

    /// Base half-life for validator-side decay, in hours.
    #[serde(default = "default_half_life_hours")]
    pub default_half_life_hours: f64,

    /// Volatility factor assumed when the caller supplies none.
    #[serde(default = "default_volatility")]
    pub default_volatility: f64,

    #[serde(default = "default_low_axis_threshold")]
    pub low_axis_threshold: f64,

    #[serde(default)]
    pub trend_pullback: TrendPullbackParams,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: WeightConfig::default(),
            default_half_life_hours: default_half_life_hours(),
            default_volatility: default_volatility(),
            low_axis_threshold: default_low_axis_threshold(),
            trend_pullback: TrendPullbackParams::default(),
        }
    }
}

impl ScoringConfig {
    /// Load configuration from a JSON file at `path` and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scoring config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scoring config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid scoring config in {}", path.display()))?;

        info!(
            path = %path.display(),
            weights_id = ?config.weights.id,
            half_life_hours = config.default_half_life_hours,
            "scoring config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise scoring config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "scoring config saved (atomic)");
        Ok(())
    }

    /// Reject values the hot path would otherwise silently coerce.
    pub fn validate(&self) -> Result<()> {
        for axis in Axis::ALL {
            let w = self.weights.weight(axis);
            if !(w.is_finite() && w >= 0.0) {
                bail!("{axis} weight must be a finite non-negative number, got {w}");
            }
        }
        if !(self.default_half_life_hours > 0.0 && self.default_half_life_hours.is_finite()) {
            bail!(
                "defaultHalfLifeHours must be > 0, got {}",
                self.default_half_life_hours
            );
        }
        if !(self.default_volatility > 0.0 && self.default_volatility.is_finite()) {
            bail!(
                "defaultVolatility must be > 0, got {}",
                self.default_volatility
            );
        }
        if !(0.0..=1.0).contains(&self.low_axis_threshold) {
            bail!(
                "lowAxisThreshold must be within [0, 1], got {}",
                self.low_axis_threshold
            );
        }
        let bands = self.trend_pullback.rr_bands;
        if bands.windows(2).any(|w| !(w[0] < w[1])) {
            bail!("trendPullback.rrBands must be strictly increasing, got {bands:?}");
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskBucket;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.weights, WeightConfig::default());
        assert!((cfg.default_half_life_hours - 24.0).abs() < f64::EPSILON);
        assert!((cfg.default_volatility - 1.0).abs() < f64::EPSILON);
        assert!((cfg.low_axis_threshold - 0.4).abs() < f64::EPSILON);
        assert_eq!(cfg.trend_pullback.rr_bands, [1.0, 1.5, 3.0, 4.0]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: ScoringConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ScoringConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "weights": { "id": "gov-v2", "structureWeight": 0.4, "executionWeight": 0.3,
                         "riskWeight": 0.2, "insightWeight": 0.1 },
            "trendPullback": { "riskBuckets": { "low": "low", "normal": "low",
                                                "high": "medium", "extreme": "high" } }
        }"#;
        let cfg: ScoringConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.weights.id.as_deref(), Some("gov-v2"));
        assert!((cfg.weights.structure_weight - 0.4).abs() < f64::EPSILON);
        assert_eq!(cfg.trend_pullback.risk_buckets.extreme, RiskBucket::High);
        assert_eq!(cfg.trend_pullback.default_base_asset, "BTC");
        assert!((cfg.default_half_life_hours - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = ScoringConfig::default();
        cfg.weights.risk_weight = -0.5;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("risk weight"));

        let mut cfg = ScoringConfig::default();
        cfg.default_half_life_hours = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScoringConfig::default();
        cfg.trend_pullback.rr_bands = [1.0, 3.0, 1.5, 4.0];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_weights_are_valid_config() {
        let mut cfg = ScoringConfig::default();
        cfg.weights = WeightConfig::new(0.0, 0.0, 0.0, 0.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("scoring-config-{}.json", uuid::Uuid::new_v4()));

        let mut cfg = ScoringConfig::default();
        cfg.weights = WeightConfig::new(2.0, 1.0, 1.0, 0.0).with_id("test-weights");
        cfg.save(&path).unwrap();

        let loaded = ScoringConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
        let err = ScoringConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read scoring config"));
    }
}
