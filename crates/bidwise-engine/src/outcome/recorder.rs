//! Real-world outcome intake.

use std::sync::Arc;

use bidwise_core::barrier::{FieldValue, FieldWriter, WriteBarrier};
use bidwise_core::config::CalibrationConfig;
use bidwise_core::errors::OutcomeError;
use bidwise_core::models::{
    OutcomeObservation, OutcomeStatus, Recommendation, RecommendationId,
};
use bidwise_core::traits::{Clock, RecommendationStore, SystemClock};

use super::calibration::{CalibrationCalculator, CalibrationReport};

/// Records outcomes and keeps per-recommendation calibration current.
pub struct OutcomeRecorder {
    store: Arc<dyn RecommendationStore>,
    calculator: CalibrationCalculator,
    clock: Arc<dyn Clock>,
}

impl OutcomeRecorder {
    pub fn new(store: Arc<dyn RecommendationStore>, config: &CalibrationConfig) -> Self {
        Self {
            store,
            calculator: CalibrationCalculator::new(config),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record `status` for `id`. Re-recording overwrites the previous
    /// outcome; the population counts each recommendation once.
    pub fn record(
        &self,
        id: &RecommendationId,
        status: OutcomeStatus,
        notes: Option<String>,
    ) -> Result<Recommendation, OutcomeError> {
        let mut rec = self
            .store
            .get(id)?
            .ok_or_else(|| OutcomeError::UnknownRecommendation(id.to_string()))?;
        let now = self.clock.now();

        WriteBarrier::for_writer(FieldWriter::OutcomeRecorder).write(
            &mut rec,
            FieldValue::Outcome {
                status,
                recorded_at: now,
                notes,
            },
        )?;

        let mut population: Vec<OutcomeObservation> = self
            .store
            .outcomes()?
            .into_iter()
            .filter(|o| o.recommendation_id != *id)
            .collect();
        population.push(OutcomeObservation {
            recommendation_id: *id,
            confidence_score: rec.decision().confidence_score,
            status,
            recorded_at: now,
        });

        if let Some(metrics) = self.calculator.metrics_for(id, &population, now) {
            WriteBarrier::for_writer(FieldWriter::Calibration)
                .write(&mut rec, FieldValue::CalibrationMetrics(metrics))?;
        }

        self.store.update_outcome(&rec)?;
        tracing::info!(
            recommendation = %id,
            outcome = status.as_str(),
            population = population.len(),
            "outcome recorded"
        );
        Ok(rec)
    }

    /// Calibration over every stored outcome.
    pub fn report(&self) -> Result<CalibrationReport, OutcomeError> {
        let outcomes = self.store.outcomes()?;
        Ok(self.calculator.report(&outcomes, self.clock.now()))
    }
}
