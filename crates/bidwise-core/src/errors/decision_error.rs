//! Decision finalization errors.

use super::error_code::{self, ErrorCode};

/// Errors that can occur while producing a finalized recommendation.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("No requirements to decide on")]
    NoRequirements,

    #[error("Confidence score {0} exceeds 100")]
    ScoreOutOfRange(u16),

    #[error("Justification too short: {actual} chars (minimum {minimum})")]
    JustificationTooShort { actual: usize, minimum: usize },

    #[error("Executive summary too short: {actual} chars (minimum {minimum})")]
    ExecutiveSummaryTooShort { actual: usize, minimum: usize },

    #[error("Inconsistent compliance summary: {0}")]
    InconsistentSummary(String),

    #[error("Failed to seal decision: {0}")]
    Seal(String),
}

impl ErrorCode for DecisionError {
    fn error_code(&self) -> &'static str {
        error_code::DECISION_ERROR
    }
}
