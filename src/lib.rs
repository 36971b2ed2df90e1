// =============================================================================
// UWR Scoring Core — Library Root
// =============================================================================
//
// Deterministic signal scoring:
//   strategy input → axis normalizer → UWR aggregator → score record
//   → read-time decay → validator decision
//
// Every function here is pure and synchronous.  Time is always passed in,
// never read from the clock, so the same inputs score the same way on every
// node.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
pub mod analyst;
pub mod error;
pub mod scoring_config;
pub mod signals;
pub mod types;
pub mod validator;

pub use analyst::{
    AxisNormalizer, NormalizedAxes, NormalizerRegistry, ScoreFields, ScoreRecord, SignalContext,
    TrendPullbackInput, TrendPullbackNormalizer,
};
pub use error::{DecayError, FieldIssue, ScoringError, ValidationError};
pub use scoring_config::ScoringConfig;
pub use signals::{
    apply_time_decay, calculate_adjusted_half_life, compute_uwr_score, pick_decay_params,
    DecayParams, UwrAxes, WeightConfig,
};
pub use types::{Direction, HoldingHorizon, MarketType, RiskBucket};
pub use validator::{
    compute_validator_score, compute_validator_score_from_config, DecisionLog, ValidatorDecision,
    ValidatorDecisionKind, ValidatorScoreOutput,
};
