//! Sequential, failure-isolated enrichment orchestrator.
//!
//! Steps run one at a time in a fixed order. Each runs on its own thread
//! over a snapshot of the recommendation and is bounded by a soft timeout
//! and the remaining run budget. A step that fails, panics, or overruns
//! leaves its field empty and the run moves on. A step that overruns is
//! abandoned; its late result is discarded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use bidwise_core::barrier::{WriteBarrier, WriteEffect};
use bidwise_core::config::BidwiseConfig;
use bidwise_core::errors::EnrichmentError;
use bidwise_core::models::{Lifecycle, Recommendation};
use bidwise_core::traits::{
    Cancellable, CancellationToken, EmbeddingProvider, ReflectionReasoner,
};

use super::clarification::ClarificationStep;
use super::embedding::EmbeddingStep;
use super::reflection::ReflectionStep;
use super::step::{EnrichmentReport, EnrichmentStep, StepId, StepOutcome};

pub struct EnrichmentOrchestrator {
    steps: Vec<Arc<dyn EnrichmentStep>>,
    /// Per-step soft timeout.
    step_timeout: Duration,
    /// Budget for one run across all steps.
    budget: Duration,
}

impl EnrichmentOrchestrator {
    /// Orchestrator over custom steps, run in the given order.
    pub fn with_steps(steps: Vec<Arc<dyn EnrichmentStep>>, config: &BidwiseConfig) -> Self {
        Self {
            steps,
            step_timeout: config.enrichment.step_timeout(),
            budget: config.enrichment.budget(),
        }
    }

    /// Reflection, then clarification, then embedding.
    pub fn standard(
        config: &BidwiseConfig,
        reasoner: Arc<dyn ReflectionReasoner>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let steps: Vec<Arc<dyn EnrichmentStep>> = vec![
            Arc::new(ReflectionStep::new(reasoner)),
            Arc::new(ClarificationStep::new(&config.enrichment)),
            Arc::new(EmbeddingStep::new(
                provider,
                config.enrichment.embedding_dimensions,
            )),
        ];
        Self::with_steps(steps, config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn step_ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Run every step over `recommendation`. Never fails: problems are
    /// recorded in the report and the affected field stays empty. Steps
    /// whose field is already populated are skipped, so re-running is safe.
    pub fn enrich(
        &self,
        mut recommendation: Recommendation,
        cancel: &CancellationToken,
    ) -> (Recommendation, EnrichmentReport) {
        let mut report = EnrichmentReport::default();
        let id = recommendation.id();

        if !recommendation.verify_seal() {
            let error = EnrichmentError::SealMismatch(id.to_string());
            tracing::warn!(recommendation_id = %id, error = %error, "refusing to enrich");
            report.outcomes = self
                .steps
                .iter()
                .map(|s| StepOutcome::skipped(s.id(), "decision seal mismatch"))
                .collect();
            return (recommendation, report);
        }
        report.seal_verified = true;

        let started = Instant::now();
        for step in &self.steps {
            let step_id = step.id();

            if cancel.is_cancelled() {
                report.cancelled = true;
                report
                    .outcomes
                    .push(StepOutcome::skipped(step_id, "enrichment cancelled"));
                continue;
            }

            let fields = step_id.writer().allowlist();
            if fields.iter().all(|f| f.is_populated(&recommendation)) {
                report
                    .outcomes
                    .push(StepOutcome::skipped(step_id, "field already populated"));
                continue;
            }

            let remaining = self.budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                tracing::warn!(recommendation_id = %id, step = step_id.as_str(), "enrichment budget exhausted");
                report
                    .outcomes
                    .push(StepOutcome::skipped(step_id, "enrichment budget exhausted"));
                continue;
            }

            let outcome = self.run_step(step, &mut recommendation, remaining.min(self.step_timeout));
            report.outcomes.push(outcome);
        }

        if !report.cancelled && recommendation.lifecycle() < Lifecycle::Enriched {
            if let Err(e) = WriteBarrier::advance(&mut recommendation, Lifecycle::Enriched) {
                tracing::warn!(recommendation_id = %id, error = %e, "lifecycle not advanced");
            }
        }

        debug_assert!(recommendation.verify_seal());
        tracing::info!(
            recommendation_id = %id,
            applied = report.applied_count(),
            failed = report.failures().count(),
            cancelled = report.cancelled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enrichment finished"
        );
        (recommendation, report)
    }

    fn run_step(
        &self,
        step: &Arc<dyn EnrichmentStep>,
        recommendation: &mut Recommendation,
        limit: Duration,
    ) -> StepOutcome {
        let step_id = step.id();
        let id = recommendation.id();
        let snapshot = Arc::new(recommendation.clone());
        let (tx, rx) = crossbeam_channel::bounded(1);
        let worker = Arc::clone(step);
        let start = Instant::now();

        let spawned = std::thread::Builder::new()
            .name(format!("bidwise-enrich-{step_id}"))
            .spawn(move || {
                let result = worker.run(&snapshot);
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            let error = EnrichmentError::Provider {
                provider: step_id.to_string(),
                message: format!("could not spawn step thread: {e}"),
            };
            tracing::warn!(recommendation_id = %id, step = step_id.as_str(), error = %error, "enrichment step failed");
            return StepOutcome::failed(step_id, &error, 0);
        }

        let received = rx.recv_timeout(limit);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let value = match received {
            Ok(Ok(value)) => value,
            Ok(Err(error)) => {
                tracing::warn!(recommendation_id = %id, step = step_id.as_str(), error = %error, "enrichment step failed");
                return StepOutcome::failed(step_id, &error, elapsed_ms);
            }
            Err(RecvTimeoutError::Timeout) => {
                let limit_ms = limit.as_millis() as u64;
                let error = EnrichmentError::Timeout {
                    step: step_id.to_string(),
                    timeout_ms: limit_ms,
                };
                tracing::warn!(recommendation_id = %id, step = step_id.as_str(), error = %error, "enrichment step timed out");
                return StepOutcome::timed_out(step_id, limit_ms, elapsed_ms);
            }
            Err(RecvTimeoutError::Disconnected) => {
                let error = EnrichmentError::Panicked(step_id.to_string());
                tracing::warn!(recommendation_id = %id, step = step_id.as_str(), error = %error, "enrichment step panicked");
                return StepOutcome::failed(step_id, &error, elapsed_ms);
            }
        };

        match WriteBarrier::for_writer(step_id.writer()).write(recommendation, value) {
            Ok(WriteEffect::Written) => {
                tracing::debug!(recommendation_id = %id, step = step_id.as_str(), elapsed_ms, "enrichment step applied");
                StepOutcome::applied(step_id, elapsed_ms)
            }
            Ok(WriteEffect::Unchanged) => StepOutcome::unchanged(step_id, elapsed_ms),
            Err(e) => {
                let error = EnrichmentError::from(e);
                tracing::warn!(recommendation_id = %id, step = step_id.as_str(), error = %error, "enrichment write rejected");
                StepOutcome::failed(step_id, &error, elapsed_ms)
            }
        }
    }
}
