// =============================================================================
// Enrichment Adapter — Enriched signal view → trend-pullback input
// =============================================================================
//
// Anti-corruption layer between the enrichment pipeline's view of a signal
// and the trend-pullback strategy input.  Every gap is filled with the
// conservative value: missing booleans are false, missing distance is
// unknown, biases are neutral, and the ATR regime is normal until a reliable
// indicator mapping exists.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyst::context::SignalContext;
use crate::analyst::score_record::ScoreRecord;
use crate::analyst::trend_pullback::{
    AtrRegime, Bias, TrendPullbackInput, TrendPullbackNormalizer, TriggerQuality,
};
use crate::error::ValidationError;
use crate::signals::weighted_score::WeightConfig;
use crate::types::MarketType;

/// Phrases in a pattern name or sentiment tag that indicate a liquidity
/// sweep.
const SWEEP_HINTS: [&str; 4] = ["liquidity sweep", "stop hunt", "stop-hunt", "sweep"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalView {
    #[serde(default)]
    pub ema_distance_pct: Option<f64>,
    #[serde(default)]
    pub is_in_value_sweet_spot: Option<bool>,
    #[serde(default)]
    pub broke_ema_with_body: Option<bool>,
    #[serde(default)]
    pub indicators: Option<HashMap<String, Option<f64>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternView {
    #[serde(default)]
    pub pattern_name: Option<String>,
    /// Confidence on a 0..100 scale.
    #[serde(default)]
    pub pattern_confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentView {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShockDirection {
    Bullish,
    Bearish,
    Mixed,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsView {
    #[serde(default)]
    pub has_shock_event: Option<bool>,
    #[serde(default)]
    pub shock_direction: Option<ShockDirection>,
    #[serde(default)]
    pub headlines: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMlView {
    #[serde(default)]
    pub ensemble_score: Option<f64>,
    #[serde(default)]
    pub model_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentMeta {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub enriched_by: Option<String>,
    #[serde(default)]
    pub enriched_at: Option<String>,
}

/// An enriched signal as seen by the analyst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedView {
    pub signal_id: String,
    pub symbol: String,
    pub market: String,
    pub timeframe: String,
    #[serde(default)]
    pub technical: Option<TechnicalView>,
    #[serde(default)]
    pub pattern: Option<PatternView>,
    #[serde(default)]
    pub sentiment: Option<SentimentView>,
    #[serde(default)]
    pub news: Option<NewsView>,
    #[serde(default)]
    pub ai_ml: Option<AiMlView>,
    #[serde(default)]
    pub enrichment_meta: Option<EnrichmentMeta>,
}

fn mentions_sweep(text: &str) -> bool {
    let lower = text.to_lowercase();
    SWEEP_HINTS.iter().any(|hint| lower.contains(hint))
}

impl EnrichedView {
    /// Map this view onto trend-pullback input.
    pub fn to_trend_pullback_input(&self) -> TrendPullbackInput {
        let technical = self.technical.clone().unwrap_or_default();
        let pattern = self.pattern.clone().unwrap_or_default();

        let pulled_back_into_sweet_spot = technical.is_in_value_sweet_spot.unwrap_or(false);
        let broke_ema_with_body = technical.broke_ema_with_body.unwrap_or(false);

        let trigger_pattern_quality = pattern
            .pattern_confidence
            .map(TriggerQuality::from_confidence)
            .unwrap_or_default();

        let sentiment_tags = self
            .sentiment
            .as_ref()
            .and_then(|s| s.tags.as_deref())
            .unwrap_or_default();
        let liquidity_swept = pattern
            .pattern_name
            .iter()
            .chain(sentiment_tags.iter())
            .any(|hint| mentions_sweep(hint));

        let rr_multiple_planned = if pulled_back_into_sweet_spot && !broke_ema_with_body {
            2.0
        } else {
            1.0
        };

        TrendPullbackInput {
            weekly_bias: Bias::Neutral,
            daily_bias: Bias::Neutral,
            ha_flat_back_confirmed: false,
            distance_from_daily_ema_pct: technical.ema_distance_pct,
            pulled_back_into_sweet_spot,
            broke_ema_with_body,
            liquidity_swept,
            trigger_pattern_quality,
            atr_regime: AtrRegime::Normal,
            rr_multiple_planned,
        }
    }

    /// Record context drawn from the view.
    pub fn signal_context(&self, scored_at: DateTime<Utc>) -> SignalContext {
        let mut ctx = SignalContext::new(scored_at)
            .with_symbol(self.symbol.clone())
            .with_market(MarketType::from_label(&self.market));
        if !self.timeframe.trim().is_empty() {
            ctx = ctx.with_timeframe(self.timeframe.clone());
        }
        ctx
    }
}

impl TrendPullbackNormalizer {
    /// Score an enriched view end to end.
    pub fn score_enriched(
        &self,
        view: &EnrichedView,
        scored_at: DateTime<Utc>,
        weights: &WeightConfig,
    ) -> Result<ScoreRecord, ValidationError> {
        let input = view.to_trend_pullback_input();
        self.score(&input, &view.signal_context(scored_at), weights)
    }
}
