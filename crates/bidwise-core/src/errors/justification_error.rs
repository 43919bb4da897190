//! Justification writer errors.

use super::error_code::{self, ErrorCode};

/// Errors reported by a justification writer. Never fatal to finalization:
/// the pipeline falls back to the template writer.
#[derive(Debug, thiserror::Error)]
pub enum JustificationError {
    #[error("Writer {writer} unavailable: {message}")]
    Unavailable { writer: String, message: String },

    #[error("Writer {writer} produced unusable text: {message}")]
    InvalidOutput { writer: String, message: String },

    #[error("Writer {writer} timed out after {timeout_ms}ms")]
    TimedOut { writer: String, timeout_ms: u64 },

    #[error("Writer {writer} panicked")]
    Panicked { writer: String },
}

impl ErrorCode for JustificationError {
    fn error_code(&self) -> &'static str {
        error_code::JUSTIFICATION_FAILED
    }
}
