//! Evidence validation errors.

use super::error_code::{self, ErrorCode};

/// Errors raised while validating or normalizing raw evidence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvidenceError {
    #[error("Confidence out of range for {requirement_ref}: {value} (expected 0.0..=1.0)")]
    ConfidenceOutOfRange { requirement_ref: String, value: f64 },

    #[error("Unknown compliance level tag: {0}")]
    UnknownLevel(String),

    #[error("No compliance level for {source_tool} status '{raw_status}'")]
    Unmapped {
        source_tool: String,
        raw_status: String,
    },

    #[error("Evidence from {0} has an empty requirement reference")]
    EmptyRequirementRef(String),

    #[error("Evidence for {0} has an empty source")]
    EmptySource(String),
}

impl ErrorCode for EvidenceError {
    fn error_code(&self) -> &'static str {
        error_code::EVIDENCE_INVALID
    }
}
