//! Enrichment step errors.

use super::error_code::{self, ErrorCode};
use super::BarrierError;

/// Errors produced by an individual enrichment step or its provider.
/// The orchestrator records these and moves on to the next step.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding contains a non-finite value at index {0}")]
    NonFiniteEmbedding(usize),

    #[error("Step {step} exceeded its {timeout_ms}ms time limit")]
    Timeout { step: String, timeout_ms: u64 },

    #[error("Step {0} panicked")]
    Panicked(String),

    #[error("Decision seal mismatch for recommendation {0}")]
    SealMismatch(String),

    #[error(transparent)]
    Barrier(#[from] BarrierError),
}

impl ErrorCode for EnrichmentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Barrier(e) => e.error_code(),
            _ => error_code::ENRICHMENT_FAILED,
        }
    }
}
