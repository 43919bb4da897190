//! Pipeline errors and non-fatal error collection.

use super::error_code::{self, ErrorCode};
use super::{
    BarrierError, ConfigError, DecisionError, EnrichmentError, EvidenceError,
    JustificationError, OutcomeError, StorageError,
};

/// Errors that can occur while running the bid pipeline.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Evidence error: {0}")]
    Evidence(#[from] EvidenceError),

    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),

    #[error("Justification error: {0}")]
    Justification(#[from] JustificationError),

    #[error("Enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    #[error("Write barrier error: {0}")]
    Barrier(#[from] BarrierError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Outcome error: {0}")]
    Outcome(#[from] OutcomeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline cancelled")]
    Cancelled,
}

impl ErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Evidence(e) => e.error_code(),
            Self::Decision(e) => e.error_code(),
            Self::Justification(e) => e.error_code(),
            Self::Enrichment(e) => e.error_code(),
            Self::Barrier(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Outcome(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Result of a pipeline stage that accumulates non-fatal errors.
/// Allows the stage result to be returned even when side work fails.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Non-fatal errors collected during the stage.
    pub errors: Vec<PipelineError>,
}

impl<T: Default> PipelineResult<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: PipelineError) {
        self.errors.push(error);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
