//! Outcome recording errors.

use super::error_code::{self, ErrorCode};
use super::{BarrierError, StorageError};

/// Errors that can occur while recording a bid outcome.
#[derive(Debug, thiserror::Error)]
pub enum OutcomeError {
    #[error("Recommendation {0} not found")]
    UnknownRecommendation(String),

    #[error("Unknown outcome status: {0}")]
    UnknownStatus(String),

    #[error(transparent)]
    Barrier(#[from] BarrierError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ErrorCode for OutcomeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Barrier(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            _ => error_code::OUTCOME_ERROR,
        }
    }
}
