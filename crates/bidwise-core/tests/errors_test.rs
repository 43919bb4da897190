//! Error code mapping tests.

use bidwise_core::errors::{
    BarrierError, DecisionError, EnrichmentError, ErrorCode, EvidenceError, JustificationError,
    OutcomeError, PipelineError, PipelineResult, StorageError,
};

#[test]
fn every_subsystem_maps_to_its_code() {
    assert_eq!(
        EvidenceError::UnknownLevel("X".into()).error_code(),
        "EVIDENCE_INVALID"
    );
    assert_eq!(DecisionError::NoRequirements.error_code(), "DECISION_ERROR");
    assert_eq!(
        EnrichmentError::Panicked("embedding".into()).error_code(),
        "ENRICHMENT_FAILED"
    );
    assert_eq!(
        StorageError::NotFound { id: "x".into() }.error_code(),
        "STORAGE_ERROR"
    );
    assert_eq!(PipelineError::Cancelled.error_code(), "CANCELLED");
    assert_eq!(
        PipelineError::from(JustificationError::InvalidOutput {
            writer: "llm".into(),
            message: "too short".into(),
        })
        .error_code(),
        "JUSTIFICATION_FAILED"
    );
}

/// Wrapped barrier errors keep the barrier code.
#[test]
fn wrapped_errors_keep_inner_code() {
    let barrier = BarrierError::AlreadyWritten {
        field: "embedding".into(),
    };
    assert_eq!(
        EnrichmentError::from(barrier.clone()).error_code(),
        "WRITE_BARRIER_VIOLATION"
    );
    assert_eq!(
        OutcomeError::from(barrier.clone()).error_code(),
        "WRITE_BARRIER_VIOLATION"
    );
    assert_eq!(
        PipelineError::from(barrier).error_code(),
        "WRITE_BARRIER_VIOLATION"
    );
    assert_eq!(
        PipelineError::from(OutcomeError::UnknownRecommendation("id".into())).error_code(),
        "OUTCOME_ERROR"
    );
}

#[test]
fn pipeline_result_collects_non_fatal_errors() {
    let mut result: PipelineResult<Vec<u8>> = PipelineResult::new(vec![1]);
    assert!(result.is_clean());
    result.add_error(PipelineError::Storage(StorageError::Unavailable {
        message: "disk full".into(),
    }));
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.data, vec![1]);
}
