// =============================================================================
// Error types for the scoring core
// =============================================================================
//
// The aggregator never fails.  Decay rejects parameters with no numeric
// meaning, and record assembly rejects records that break the schema.

use thiserror::Error;

/// Decay parameter misuse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecayError {
    #[error("invalid halfLifeMinutes: {0}, must be > 0")]
    InvalidHalfLife(f64),

    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// A single schema violation on an assembled record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted field path in wire naming (e.g. `uwrAxes.risk`).
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A score record failed validation.  Lists every failing field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("score record failed validation: {}", format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Field paths that failed, in check order.
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors surfaced by strategy dispatch and the validator layer.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("no axis normalizer registered for strategy {0:?}")]
    UnknownStrategy(String),

    #[error("malformed input for strategy {strategy_id:?}: {source}")]
    MalformedInput {
        strategy_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Decay(#[from] DecayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_every_field() {
        let err = ValidationError {
            issues: vec![
                FieldIssue::new("uwrScore", "must be within [0, 1], got 1.2"),
                FieldIssue::new("scoredAt", "not an ISO-8601 timestamp"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("uwrScore: must be within [0, 1], got 1.2"));
        assert!(msg.contains("scoredAt"));
        assert_eq!(err.fields(), vec!["uwrScore", "scoredAt"]);
        assert!(err.has_field("scoredAt"));
    }

    #[test]
    fn half_life_error_shows_offending_value() {
        let err = DecayError::InvalidHalfLife(-5.0);
        assert_eq!(err.to_string(), "invalid halfLifeMinutes: -5, must be > 0");
    }
}
