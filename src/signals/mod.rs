// =============================================================================
// Signals Module
// =============================================================================
//
// Scoring math shared by every analyst and validator:
// - Universal Weighting Rule aggregation of the four quality axes
// - Half-life time decay of scores
// - Horizon-specific decay templates

pub mod decay_template;
pub mod signal_decay;
pub mod weighted_score;

pub use decay_template::{
    apply_template_decay, default_template, default_templates, pick_decay_params, DecayHorizon,
    DecayModel, DecayParams, GreeksDecayTemplate,
};
pub use signal_decay::{
    apply_time_decay, apply_time_decay_iso, apply_time_decay_to_uwr_score,
    apply_volatility_adjusted_decay, calculate_adjusted_half_life, parse_iso8601,
    remaining_after_half_lives, DEFAULT_SIGNAL_HALF_LIFE_HOURS,
};
pub use weighted_score::{
    clamp01, compute_uwr_score, explain_uwr_score, Axis, UwrAxes, UwrBreakdown, WeightConfig,
};
