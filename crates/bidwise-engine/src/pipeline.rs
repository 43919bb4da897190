//! `BidPipeline` façade: decide, persist, enrich, record outcomes.

use std::sync::Arc;
use std::thread;

use bidwise_core::config::BidwiseConfig;
use bidwise_core::errors::{DecisionError, PipelineError, StorageError};
use bidwise_core::models::{OutcomeStatus, Recommendation, RecommendationId, RequirementVerdict};
use bidwise_core::traits::{
    Cancellable, CancellationToken, Clock, EmbeddingProvider, JustificationWriter,
    RecommendationStore, ReflectionReasoner, RequirementSpec, SystemClock,
};

use crate::decision::{DecisionEngine, DecisionTrace};
use crate::enrichment::{EnrichmentOrchestrator, EnrichmentReport, HashedTermEmbedder, RuleReasoner};
use crate::evidence::EvidenceCollector;
use crate::outcome::{CalibrationReport, GatekeeperDecision, LearningGatekeeper, OutcomeRecorder};

/// A finalized recommendation plus what happened around it.
#[derive(Debug)]
pub struct Finalized {
    pub recommendation: Recommendation,
    pub trace: DecisionTrace,
    /// `false` when no store is configured or every persistence attempt failed.
    pub persisted: bool,
    /// Non-fatal problems: rejected evidence, justification fallback,
    /// degraded persistence.
    pub warnings: Vec<PipelineError>,
}

#[derive(Debug)]
pub struct Enriched {
    pub recommendation: Recommendation,
    pub report: EnrichmentReport,
    pub warnings: Vec<PipelineError>,
}

pub struct BidPipeline {
    config: BidwiseConfig,
    engine: DecisionEngine,
    orchestrator: EnrichmentOrchestrator,
    reasoner: Arc<dyn ReflectionReasoner>,
    provider: Arc<dyn EmbeddingProvider>,
    gatekeeper: LearningGatekeeper,
    store: Option<Arc<dyn RecommendationStore>>,
    clock: Arc<dyn Clock>,
}

impl BidPipeline {
    /// Rule-based reflection, hashed-term embeddings, template justification,
    /// no store.
    pub fn new(config: BidwiseConfig) -> Self {
        let reasoner: Arc<dyn ReflectionReasoner> = Arc::new(RuleReasoner);
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashedTermEmbedder::new(
            config.enrichment.embedding_dimensions,
        ));
        Self {
            engine: DecisionEngine::new(&config),
            orchestrator: EnrichmentOrchestrator::standard(&config, reasoner.clone(), provider.clone()),
            reasoner,
            provider,
            gatekeeper: LearningGatekeeper::new(config.gatekeeper.clone()),
            store: None,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn RecommendationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn JustificationWriter>) -> Self {
        self.engine = self.engine.with_writer(writer);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.engine = self.engine.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_reasoner(mut self, reasoner: Arc<dyn ReflectionReasoner>) -> Self {
        self.reasoner = reasoner;
        self.rebuild_orchestrator();
        self
    }

    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = provider;
        self.rebuild_orchestrator();
        self
    }

    /// Replace the standard steps entirely.
    pub fn with_orchestrator(mut self, orchestrator: EnrichmentOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    fn rebuild_orchestrator(&mut self) {
        self.orchestrator = EnrichmentOrchestrator::standard(
            &self.config,
            self.reasoner.clone(),
            self.provider.clone(),
        );
    }

    pub fn config(&self) -> &BidwiseConfig {
        &self.config
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn gatekeeper(&self) -> &LearningGatekeeper {
        &self.gatekeeper
    }

    /// Decide over aggregated verdicts and persist the sealed recommendation.
    ///
    /// Empty input is rejected. Cancellation before persistence returns
    /// `Cancelled` and writes nothing. Storage failures are retried with
    /// backoff and then downgraded to a warning.
    pub fn finalize(
        &self,
        verdicts: &[RequirementVerdict],
        cancel: &CancellationToken,
    ) -> Result<Finalized, PipelineError> {
        if verdicts.is_empty() {
            return Err(DecisionError::NoRequirements.into());
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let decided = self.engine.decide(verdicts)?;
        let mut warnings = Vec::new();
        if let Some(e) = decided.justification_error {
            tracing::warn!(error = %e, "justification writer failed, template used");
            warnings.push(PipelineError::Justification(e));
        }

        if cancel.is_cancelled() {
            tracing::info!(
                recommendation_id = %decided.recommendation.id(),
                "cancelled before persistence"
            );
            return Err(PipelineError::Cancelled);
        }

        let persisted = match &self.store {
            Some(store) => {
                let rec = &decided.recommendation;
                match self.persist("insert_finalized", || store.insert_finalized(rec)) {
                    Ok(()) => true,
                    Err(e) => {
                        warnings.push(PipelineError::Storage(e));
                        false
                    }
                }
            }
            None => false,
        };

        Ok(Finalized {
            recommendation: decided.recommendation,
            trace: decided.trace,
            persisted,
            warnings,
        })
    }

    /// Collect evidence with `collector`, then finalize. Rejected evidence
    /// is carried into the warnings.
    pub fn finalize_requirements(
        &self,
        collector: &EvidenceCollector,
        requirements: &[RequirementSpec],
        cancel: &CancellationToken,
    ) -> Result<Finalized, PipelineError> {
        let collected = collector.collect(requirements, cancel)?;
        let mut finalized = self.finalize(&collected.data, cancel)?;
        let mut warnings = collected.errors;
        warnings.append(&mut finalized.warnings);
        finalized.warnings = warnings;
        Ok(finalized)
    }

    /// Run the enrichment steps and persist what they produced. Never fails.
    pub fn enrich(&self, recommendation: &Recommendation, cancel: &CancellationToken) -> Enriched {
        let (recommendation, report) = self.orchestrator.enrich(recommendation.clone(), cancel);
        let mut warnings = Vec::new();

        if let Some(store) = &self.store {
            if report.seal_verified {
                if let Err(e) =
                    self.persist("update_enrichment", || store.update_enrichment(&recommendation))
                {
                    warnings.push(PipelineError::Storage(e));
                }
            }
        }

        Enriched {
            recommendation,
            report,
            warnings,
        }
    }

    pub fn recorder(&self) -> Result<OutcomeRecorder, PipelineError> {
        let store = self.require_store()?;
        Ok(OutcomeRecorder::new(store, &self.config.calibration).with_clock(self.clock.clone()))
    }

    pub fn record_outcome(
        &self,
        id: &RecommendationId,
        status: OutcomeStatus,
        notes: Option<String>,
    ) -> Result<Recommendation, PipelineError> {
        Ok(self.recorder()?.record(id, status, notes)?)
    }

    pub fn calibration_report(&self) -> Result<CalibrationReport, PipelineError> {
        Ok(self.recorder()?.report()?)
    }

    /// Gatekeeper verdict over every stored outcome.
    pub fn learning_status(&self) -> Result<GatekeeperDecision, PipelineError> {
        let outcomes = self.require_store()?.outcomes()?;
        Ok(self.gatekeeper.evaluate(&outcomes, self.clock.now()))
    }

    fn require_store(&self) -> Result<Arc<dyn RecommendationStore>, PipelineError> {
        self.store.clone().ok_or_else(|| {
            PipelineError::Storage(StorageError::Unavailable {
                message: "no recommendation store configured".to_string(),
            })
        })
    }

    fn persist(
        &self,
        op: &str,
        write: impl Fn() -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        let retries = self.config.persistence.max_retries;
        let mut attempt = 0;
        loop {
            match write() {
                Ok(()) => return Ok(()),
                Err(e) if is_transient(&e) && attempt < retries => {
                    let delay = self.config.persistence.backoff(attempt);
                    tracing::debug!(op, attempt, delay_ms = delay.as_millis() as u64, error = %e, "retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(op, attempts = attempt + 1, error = %e, "persistence degraded");
                    return Err(e);
                }
            }
        }
    }
}

fn is_transient(error: &StorageError) -> bool {
    matches!(
        error,
        StorageError::Unavailable { .. } | StorageError::SqliteError { .. }
    )
}
