// =============================================================================
// Validator Module
// =============================================================================
//
// Read-time scoring and decision capture on the validator side:
// - Decayed validator score from an analyst record
// - Decision envelopes, outcomes, and the append-only decision log
// - Novelty result types

pub mod decision;
pub mod novelty;
pub mod score;

pub use decision::{
    DecisionLog, LoggedDecision, ValidatorDecision, ValidatorDecisionKind, ValidatorOutcome,
};
pub use novelty::{NoveltyClass, NoveltyReferenceSignal, NoveltyResult};
pub use score::{
    compute_validator_score, compute_validator_score_from_config, compute_validator_score_with,
    ValidatorScoreOutput,
};
