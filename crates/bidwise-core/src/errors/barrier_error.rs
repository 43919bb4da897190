//! Write barrier violations.

use super::error_code::{self, ErrorCode};

/// A write to a recommendation that the barrier refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
    #[error("Writer {writer} may not write field {field}")]
    FieldNotAllowed { writer: String, field: String },

    #[error("Field {field} already written with a different value")]
    AlreadyWritten { field: String },

    #[error("Lifecycle cannot move from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Field {field} requires {prerequisite} to be set first")]
    MissingPrerequisite { field: String, prerequisite: String },
}

impl ErrorCode for BarrierError {
    fn error_code(&self) -> &'static str {
        error_code::WRITE_BARRIER_VIOLATION
    }
}
