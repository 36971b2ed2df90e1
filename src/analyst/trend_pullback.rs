// =============================================================================
// Trend Pullback v1 — Reference axis normalizer (analyst "froggy")
// =============================================================================
//
// Scores a higher-timeframe trend continuation entered on a pullback into
// the daily EMA.  Every axis is an additive sum of indicator contributions,
// clamped into [0, 1]:
//
//   structure  +0.40  weekly and daily bias agree (and are not neutral)
//              +0.20  Heikin-Ashi flat-back confirmed
//              +0.25  pulled back into the EMA sweet spot
//                     (else +0.10 if within the sweet-spot distance)
//              +0.15  EMA held (else -0.10 when broken with a candle body)
//
//   execution  trigger quality / 3, -0.15 outside the sweet spot
//
//   risk       planned R:R band  <=1: 0.20  <=1.5: 0.50  <=3: 0.90
//                                <=4: 0.75  else: 0.60
//              -0.20 when the EMA was broken with a body
//
//   insight    0.70 liquidity swept (else 0.25)
//              ATR regime  normal +0.15  high +0.05  low -0.15  extreme -0.25
//
// Missing optional context never earns credit.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyst::context::SignalContext;
use crate::analyst::normalizer::{AxisNormalizer, NormalizedAxes};
use crate::analyst::score_record::{split_symbol, AxisNotes, ScoreFields, ScoreRecord};
use crate::error::ValidationError;
use crate::scoring_config::DEFAULT_LOW_AXIS_THRESHOLD;
use crate::signals::signal_decay::NEUTRAL_FACTOR;
use crate::signals::weighted_score::{clamp01, compute_uwr_score, Axis, UwrAxes, WeightConfig};
use crate::types::{AssetClass, Direction, HoldingHorizon, MarketType, RiskBucket};

pub const ANALYST_ID: &str = "froggy";
pub const STRATEGY_ID: &str = "trend_pullback_v1";
pub const STRATEGY_VERSION: &str = "1.0.0";

// =============================================================================
// Input
// =============================================================================

/// Directional bias on one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Long,
    Short,
    Neutral,
}

/// ATR volatility regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtrRegime {
    Low,
    Normal,
    High,
    Extreme,
}

/// Trigger pattern quality on a 0..=3 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TriggerQuality(u8);

impl TriggerQuality {
    pub const MAX: u8 = 3;

    pub fn new(quality: u8) -> Option<Self> {
        (quality <= Self::MAX).then_some(Self(quality))
    }

    /// Map a pattern confidence on a 0..100 scale onto 0..=3.
    pub fn from_confidence(confidence: f64) -> Self {
        let scaled = (clamp01(confidence / 100.0) * f64::from(Self::MAX)).round();
        Self(scaled as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Quality as a fraction of the maximum.
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / f64::from(Self::MAX)
    }
}

impl TryFrom<u8> for TriggerQuality {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
            .ok_or_else(|| format!("trigger pattern quality must be 0..=3, got {value}"))
    }
}

impl From<TriggerQuality> for u8 {
    fn from(q: TriggerQuality) -> Self {
        q.0
    }
}

/// Raw attributes of a trend-pullback setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPullbackInput {
    pub weekly_bias: Bias,
    pub daily_bias: Bias,
    pub ha_flat_back_confirmed: bool,
    /// Distance from the daily EMA in percent.  Unknown distance earns no
    /// credit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_daily_ema_pct: Option<f64>,
    pub pulled_back_into_sweet_spot: bool,
    pub broke_ema_with_body: bool,
    pub liquidity_swept: bool,
    pub trigger_pattern_quality: TriggerQuality,
    pub atr_regime: AtrRegime,
    pub rr_multiple_planned: f64,
}

// =============================================================================
// Parameters
// =============================================================================

fn default_sweet_spot_distance_pct() -> f64 {
    2.0
}

fn default_rr_bands() -> [f64; 4] {
    [1.0, 1.5, 3.0, 4.0]
}

fn default_base_asset() -> String {
    "BTC".to_string()
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

fn default_timeframe() -> String {
    "1d".to_string()
}

/// ATR regime → risk bucket mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtrRiskBuckets {
    pub low: RiskBucket,
    pub normal: RiskBucket,
    pub high: RiskBucket,
    pub extreme: RiskBucket,
}

impl Default for AtrRiskBuckets {
    fn default() -> Self {
        Self {
            low: RiskBucket::Low,
            normal: RiskBucket::Medium,
            high: RiskBucket::High,
            extreme: RiskBucket::Extreme,
        }
    }
}

impl AtrRiskBuckets {
    pub fn bucket(&self, regime: AtrRegime) -> RiskBucket {
        match regime {
            AtrRegime::Low => self.low,
            AtrRegime::Normal => self.normal,
            AtrRegime::High => self.high,
            AtrRegime::Extreme => self.extreme,
        }
    }
}

/// Tunable thresholds and record defaults for the strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPullbackParams {
    /// Max EMA distance (%) that still earns partial structure credit.
    #[serde(default = "default_sweet_spot_distance_pct")]
    pub sweet_spot_distance_pct: f64,

    /// Upper bounds of the R:R bands scored 0.20 / 0.50 / 0.90 / 0.75
    /// (anything above the last bound scores 0.60).
    #[serde(default = "default_rr_bands")]
    pub rr_bands: [f64; 4],

    #[serde(default)]
    pub risk_buckets: AtrRiskBuckets,

    #[serde(default = "default_base_asset")]
    pub default_base_asset: String,

    #[serde(default = "default_quote_asset")]
    pub default_quote_asset: String,

    #[serde(default = "default_timeframe")]
    pub default_timeframe: String,
}

impl Default for TrendPullbackParams {
    fn default() -> Self {
        Self {
            sweet_spot_distance_pct: default_sweet_spot_distance_pct(),
            rr_bands: default_rr_bands(),
            risk_buckets: AtrRiskBuckets::default(),
            default_base_asset: default_base_asset(),
            default_quote_asset: default_quote_asset(),
            default_timeframe: default_timeframe(),
        }
    }
}

// =============================================================================
// Normalizer
// =============================================================================

/// Trend-pullback axis normalizer and record assembler.
#[derive(Debug, Clone)]
pub struct TrendPullbackNormalizer {
    params: TrendPullbackParams,
    low_axis_threshold: f64,
}

impl Default for TrendPullbackNormalizer {
    fn default() -> Self {
        Self::new(TrendPullbackParams::default(), DEFAULT_LOW_AXIS_THRESHOLD)
    }
}

impl TrendPullbackNormalizer {
    pub fn new(params: TrendPullbackParams, low_axis_threshold: f64) -> Self {
        Self {
            params,
            low_axis_threshold,
        }
    }

    pub fn params(&self) -> &TrendPullbackParams {
        &self.params
    }

    pub fn structure_axis(&self, input: &TrendPullbackInput) -> f64 {
        let mut score = 0.0;

        if input.weekly_bias == input.daily_bias && input.weekly_bias != Bias::Neutral {
            score += 0.4;
        }
        if input.ha_flat_back_confirmed {
            score += 0.2;
        }

        let near_ema = input
            .distance_from_daily_ema_pct
            .is_some_and(|d| d.abs() <= self.params.sweet_spot_distance_pct);
        if input.pulled_back_into_sweet_spot {
            score += 0.25;
        } else if near_ema {
            score += 0.1;
        }

        if input.broke_ema_with_body {
            score -= 0.1;
        } else {
            score += 0.15;
        }

        clamp01(score)
    }

    pub fn execution_axis(&self, input: &TrendPullbackInput) -> f64 {
        let mut score = input.trigger_pattern_quality.fraction();
        if !input.pulled_back_into_sweet_spot {
            score -= 0.15;
        }
        clamp01(score)
    }

    pub fn risk_axis(&self, input: &TrendPullbackInput) -> f64 {
        let rr = input.rr_multiple_planned;
        let [poor, fair, ideal, stretched] = self.params.rr_bands;

        let mut score = if !rr.is_finite() || rr <= poor {
            0.2
        } else if rr <= fair {
            0.5
        } else if rr <= ideal {
            0.9
        } else if rr <= stretched {
            0.75
        } else {
            0.6
        };

        if input.broke_ema_with_body {
            score -= 0.2;
        }
        clamp01(score)
    }

    pub fn insight_axis(&self, input: &TrendPullbackInput) -> f64 {
        let mut score = if input.liquidity_swept { 0.7 } else { 0.25 };
        score += match input.atr_regime {
            AtrRegime::Normal => 0.15,
            AtrRegime::High => 0.05,
            AtrRegime::Low => -0.15,
            AtrRegime::Extreme => -0.25,
        };
        clamp01(score)
    }

    /// Long or short when weekly and daily bias agree, otherwise neutral.
    pub fn direction(input: &TrendPullbackInput) -> Direction {
        match (input.weekly_bias, input.daily_bias) {
            (Bias::Long, Bias::Long) => Direction::Long,
            (Bias::Short, Bias::Short) => Direction::Short,
            _ => Direction::Neutral,
        }
    }

    pub fn risk_bucket(&self, input: &TrendPullbackInput) -> RiskBucket {
        self.params.risk_buckets.bucket(input.atr_regime)
    }

    /// Normalize, aggregate and assemble a validated score record.
    ///
    /// # Errors
    /// A `ValidationError` when the assembled record breaks the schema,
    /// e.g. a caller-supplied conviction outside [0, 1].
    pub fn score(
        &self,
        input: &TrendPullbackInput,
        ctx: &SignalContext,
        weights: &WeightConfig,
    ) -> Result<ScoreRecord, ValidationError> {
        let normalized = self.normalize(input);
        let uwr_score = compute_uwr_score(&normalized.axes, weights);

        let (base_asset, quote_asset) = split_symbol(
            ctx.symbol.as_deref(),
            &self.params.default_base_asset,
            &self.params.default_quote_asset,
        );
        let market_type = ctx.market_type.unwrap_or(MarketType::Perp);
        let instrument_type = ctx
            .instrument_type
            .unwrap_or_else(|| market_type.default_instrument());
        let signal_timeframe = ctx
            .signal_timeframe
            .clone()
            .filter(|tf| !tf.trim().is_empty())
            .unwrap_or_else(|| self.params.default_timeframe.clone());

        let weak = normalized.weak_axes(self.low_axis_threshold);
        let axis_flags = weak.iter().map(|a| format!("weak-{a}")).collect();
        let axes = normalized.axes;

        debug!(
            analyst_id = ANALYST_ID,
            strategy_id = STRATEGY_ID,
            base_asset = %base_asset,
            uwr_score,
            weak_axes = ?weak,
            "trend pullback scored"
        );

        ScoreRecord::assemble(ScoreFields {
            analyst_id: ANALYST_ID.to_string(),
            strategy_id: STRATEGY_ID.to_string(),
            strategy_version: Some(
                ctx.strategy_version
                    .clone()
                    .unwrap_or_else(|| STRATEGY_VERSION.to_string()),
            ),
            market_type,
            asset_class: ctx.asset_class.unwrap_or(AssetClass::Crypto),
            instrument_type,
            base_asset,
            quote_asset: Some(quote_asset),
            venue: ctx.venue.clone(),
            contract_size: None,
            expiry: None,
            strike: None,
            option_type: None,
            signal_timeframe,
            holding_horizon: Some(ctx.holding_horizon.unwrap_or(HoldingHorizon::Swing)),
            scored_at: ctx.scored_at_iso(),
            direction: Self::direction(input),
            risk_bucket: self.risk_bucket(input),
            conviction: ctx.conviction.unwrap_or(NEUTRAL_FACTOR),
            greeks: None,
            uwr_axes: axes,
            uwr_score,
            axis_notes: (!normalized.notes.is_empty()).then_some(normalized.notes),
            axis_flags,
            rationale: Some(format!(
                "structure={:.2} execution={:.2} risk={:.2} insight={:.2} -> uwr={:.2}",
                axes.structure, axes.execution, axes.risk, axes.insight, uwr_score
            )),
            caveats: None,
            tags: vec!["trend-following".to_string(), "pullback".to_string()],
        })
    }
}

fn weak_axis_note(axis: Axis) -> &'static str {
    match axis {
        Axis::Structure => "Weak HTF structure or EMA context.",
        Axis::Execution => "Trigger pattern quality is low for this setup.",
        Axis::Risk => "Planned risk/reward is poor or the EMA was broken.",
        Axis::Insight => "Liquidity or volatility context is weak.",
    }
}

impl AxisNormalizer for TrendPullbackNormalizer {
    type Input = TrendPullbackInput;

    fn strategy_id(&self) -> &str {
        STRATEGY_ID
    }

    fn normalize(&self, input: &TrendPullbackInput) -> NormalizedAxes {
        let axes = UwrAxes::new(
            self.structure_axis(input),
            self.execution_axis(input),
            self.risk_axis(input),
            self.insight_axis(input),
        );

        let mut notes = AxisNotes::default();
        for axis in Axis::ALL {
            if axes.get(axis) < self.low_axis_threshold {
                notes.set(axis, weak_axis_note(axis));
            }
        }

        NormalizedAxes { axes, notes }
    }
}
