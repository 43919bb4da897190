//! BidPipeline tests: persistence, degraded storage, cancellation,
//! justification fallback, and the SQLite store end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bidwise_core::config::BidwiseConfig;
use bidwise_core::errors::{
    DecisionError, EnrichmentError, JustificationError, PipelineError, StorageError,
};
use bidwise_core::models::{
    ComplianceLevel, EvidenceRecord, Lifecycle, OutcomeObservation, OutcomeStatus, Recommendation,
    RecommendationId, RequirementVerdict,
};
use bidwise_core::traits::{
    Cancellable, CancellationToken, EmbeddingProvider, Justification, JustificationRequest,
    JustificationWriter, RecommendationStore,
};
use bidwise_engine::outcome::GatekeeperStatus;
use bidwise_engine::{BidPipeline, ComplianceAggregator, MemoryStore};
use bidwise_storage::SqliteStore;

fn make_verdicts() -> Vec<RequirementVerdict> {
    vec![
        ComplianceAggregator::aggregate(
            "REQ-1",
            true,
            vec![EvidenceRecord::new("certification_checker", "REQ-1", ComplianceLevel::Compliant, 0.9).unwrap()],
        ),
        ComplianceAggregator::aggregate(
            "REQ-2",
            false,
            vec![EvidenceRecord::new("timeline_assessor", "REQ-2", ComplianceLevel::Partial, 0.7).unwrap()],
        ),
    ]
}

fn make_config() -> BidwiseConfig {
    let mut config = BidwiseConfig::default();
    config.persistence.retry_base_ms = 1;
    config.enrichment.step_timeout_ms = 2_000;
    config.enrichment.budget_ms = 5_000;
    config
}

/// Always unavailable; counts attempts.
#[derive(Default)]
struct DownStore {
    attempts: AtomicUsize,
}

impl DownStore {
    fn down(&self) -> StorageError {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        StorageError::Unavailable {
            message: "connection refused".into(),
        }
    }
}

impl RecommendationStore for DownStore {
    fn insert_finalized(&self, _: &Recommendation) -> Result<(), StorageError> {
        Err(self.down())
    }

    fn update_enrichment(&self, _: &Recommendation) -> Result<(), StorageError> {
        Err(self.down())
    }

    fn update_outcome(&self, _: &Recommendation) -> Result<(), StorageError> {
        Err(self.down())
    }

    fn get(&self, _: &RecommendationId) -> Result<Option<Recommendation>, StorageError> {
        Err(self.down())
    }

    fn outcomes(&self) -> Result<Vec<OutcomeObservation>, StorageError> {
        Err(self.down())
    }
}

struct TerseWriter;

impl JustificationWriter for TerseWriter {
    fn write(&self, _: &JustificationRequest<'_>) -> Result<Justification, JustificationError> {
        Ok(Justification {
            justification: "Bid.".into(),
            executive_summary: "Bid.".into(),
        })
    }

    fn name(&self) -> &str {
        "terse"
    }
}

struct FailingProvider;

impl EmbeddingProvider for FailingProvider {
    fn embed(&self, _: &str) -> Result<Vec<f32>, EnrichmentError> {
        Err(EnrichmentError::Provider {
            provider: "failing".into(),
            message: "connection refused".into(),
        })
    }

    fn dimensions(&self) -> usize {
        256
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Returns the same unit vector for every text.
struct ConstantProvider;

impl EmbeddingProvider for ConstantProvider {
    fn embed(&self, _: &str) -> Result<Vec<f32>, EnrichmentError> {
        let mut v = vec![0.0; 256];
        v[0] = 1.0;
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        256
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Enrich once, then re-run enrichment from the finalized copy with a
/// failing and then a disagreeing embedding provider.
fn assert_rerun_keeps_stored_enrichment(store: Arc<dyn RecommendationStore>) {
    let cancel = CancellationToken::new();
    let pipeline = BidPipeline::new(make_config()).with_store(store.clone());
    let finalized = pipeline.finalize(&make_verdicts(), &cancel).unwrap();
    let id = finalized.recommendation.id();
    let first = pipeline.enrich(&finalized.recommendation, &cancel);
    assert!(first.warnings.is_empty());
    let stored = store.get(&id).unwrap().unwrap();
    assert!(stored.enrichment().embedding.is_some());

    let failing = BidPipeline::new(make_config())
        .with_store(store.clone())
        .with_embedding_provider(Arc::new(FailingProvider));
    let rerun = failing.enrich(&finalized.recommendation, &cancel);
    assert!(rerun.recommendation.enrichment().embedding.is_none());
    assert!(rerun.warnings.is_empty());
    assert_eq!(store.get(&id).unwrap().unwrap(), stored);

    let disagreeing = BidPipeline::new(make_config())
        .with_store(store.clone())
        .with_embedding_provider(Arc::new(ConstantProvider));
    let rerun = disagreeing.enrich(&finalized.recommendation, &cancel);
    assert!(rerun.warnings.iter().any(|w| matches!(
        w,
        PipelineError::Storage(StorageError::FieldConflict { field, .. }) if field == "embedding"
    )));
    assert_eq!(store.get(&id).unwrap().unwrap(), stored);
}

#[test]
fn enrichment_rerun_keeps_stored_fields_in_memory() {
    assert_rerun_keeps_stored_enrichment(Arc::new(MemoryStore::new()));
}

#[test]
fn enrichment_rerun_keeps_stored_fields_on_sqlite() {
    assert_rerun_keeps_stored_enrichment(Arc::new(SqliteStore::open_in_memory().unwrap()));
}

#[test]
fn empty_input_is_rejected() {
    let pipeline = BidPipeline::new(make_config());
    let err = pipeline.finalize(&[], &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Decision(DecisionError::NoRequirements)));
}

/// Cancellation before finalization completes persists nothing.
#[test]
fn cancelled_finalize_persists_nothing() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = BidPipeline::new(make_config()).with_store(store.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = pipeline.finalize(&make_verdicts(), &cancel).unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
    assert!(store.is_empty());
}

/// Storage that stays down degrades to a warning after the retries.
#[test]
fn unavailable_store_degrades_gracefully() {
    let store = Arc::new(DownStore::default());
    let config = make_config();
    let retries = config.persistence.max_retries as usize;
    let pipeline = BidPipeline::new(config).with_store(store.clone());

    let finalized = pipeline.finalize(&make_verdicts(), &CancellationToken::new()).unwrap();

    assert!(!finalized.persisted);
    assert!(finalized.recommendation.verify_seal());
    assert_eq!(store.attempts.load(Ordering::SeqCst), retries + 1);
    assert!(finalized
        .warnings
        .iter()
        .any(|w| matches!(w, PipelineError::Storage(StorageError::Unavailable { .. }))));

    let enriched = pipeline.enrich(&finalized.recommendation, &CancellationToken::new());
    assert_eq!(enriched.recommendation.lifecycle(), Lifecycle::Enriched);
    assert_eq!(enriched.warnings.len(), 1);
}

#[test]
fn short_writer_output_falls_back_to_template() {
    let pipeline = BidPipeline::new(make_config()).with_writer(Arc::new(TerseWriter));
    let finalized = pipeline.finalize(&make_verdicts(), &CancellationToken::new()).unwrap();

    assert!(finalized.recommendation.decision().justification.chars().count() >= 50);
    assert!(finalized
        .warnings
        .iter()
        .any(|w| matches!(w, PipelineError::Justification(_))));
}

#[test]
fn outcome_without_store_is_an_error() {
    let pipeline = BidPipeline::new(make_config());
    let err = pipeline
        .record_outcome(&RecommendationId::new(), OutcomeStatus::Won, None)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Storage(StorageError::Unavailable { .. })));
}

/// Finalize, enrich, record, and gate through the SQLite store.
#[test]
fn full_lifecycle_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("bidwise.db")).unwrap());
    let pipeline = BidPipeline::new(make_config()).with_store(store.clone());
    let cancel = CancellationToken::new();

    let finalized = pipeline.finalize(&make_verdicts(), &cancel).unwrap();
    assert!(finalized.persisted);
    let id = finalized.recommendation.id();

    let enriched = pipeline.enrich(&finalized.recommendation, &cancel);
    assert!(enriched.warnings.is_empty());
    let stored = store.get(&id).unwrap().unwrap();
    assert_eq!(stored, enriched.recommendation);
    assert_eq!(stored.lifecycle(), Lifecycle::Enriched);

    let recorded = pipeline.record_outcome(&id, OutcomeStatus::Won, None).unwrap();
    assert_eq!(recorded.lifecycle(), Lifecycle::OutcomeRecorded);
    assert!(recorded.enrichment().embedding.is_some());
    assert_eq!(recorded.decision(), finalized.recommendation.decision());

    let gate = pipeline.learning_status().unwrap();
    assert!(!gate.allowed);
    assert_eq!(gate.status, GatekeeperStatus::InsufficientData);
}

/// Enriching the stored copy again is a no-op for the row.
#[test]
fn re_enrichment_leaves_row_unchanged() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = BidPipeline::new(make_config()).with_store(store.clone());
    let cancel = CancellationToken::new();
    let finalized = pipeline.finalize(&make_verdicts(), &cancel).unwrap();
    let first = pipeline.enrich(&finalized.recommendation, &cancel);
    let second = pipeline.enrich(&first.recommendation, &cancel);

    assert_eq!(second.report.applied_count(), 0);
    assert_eq!(
        store.get(&finalized.recommendation.id()).unwrap().unwrap(),
        first.recommendation
    );
}
