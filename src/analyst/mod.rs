// =============================================================================
// Analyst Module
// =============================================================================
//
// Everything between a strategy's raw input and a validated score record:
// - Axis normalizer contract and the strategy-id registry
// - The canonical score record and its validation
// - trend_pullback_v1, the reference strategy, plus its enrichment adapter

pub mod context;
pub mod enrichment;
pub mod normalizer;
pub mod score_record;
pub mod trend_pullback;

pub use context::SignalContext;
pub use enrichment::EnrichedView;
pub use normalizer::{AxisNormalizer, NormalizedAxes, NormalizerRegistry};
pub use score_record::{split_symbol, AxisNotes, Greeks, ScoreFields, ScoreRecord};
pub use trend_pullback::{
    AtrRegime, Bias, TrendPullbackInput, TrendPullbackNormalizer, TrendPullbackParams,
    TriggerQuality,
};
