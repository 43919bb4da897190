//! In-process recommendation store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use bidwise_core::barrier::WriteBarrier;
use bidwise_core::errors::StorageError;
use bidwise_core::models::{
    EnrichmentRecord, OutcomeObservation, Recommendation, RecommendationId,
};
use bidwise_core::traits::RecommendationStore;

/// `RecommendationStore` over a mutex-guarded map. Updates merge only the
/// columns the caller owns, like the SQLite store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<RecommendationId, Recommendation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<RecommendationId, Recommendation>>, StorageError> {
        self.rows.lock().map_err(|_| StorageError::Unavailable {
            message: "memory store lock poisoned".to_string(),
        })
    }

    fn merge(
        &self,
        incoming: &Recommendation,
        apply: impl FnOnce(&mut EnrichmentRecord, &EnrichmentRecord) -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        let mut rows = self.lock()?;
        let id = incoming.id();
        let stored = rows
            .get(&id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;
        if stored.seal() != incoming.seal() {
            return Err(StorageError::DecisionMismatch { id: id.to_string() });
        }

        let mut enrichment = stored.enrichment().clone();
        apply(&mut enrichment, incoming.enrichment())?;
        let merged = Recommendation::from_parts(
            id,
            stored.lifecycle().max(incoming.lifecycle()),
            stored.decision().clone(),
            stored.seal().clone(),
            enrichment,
        )
        .map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })?;
        rows.insert(id, merged);
        Ok(())
    }
}

impl RecommendationStore for MemoryStore {
    fn insert_finalized(&self, recommendation: &Recommendation) -> Result<(), StorageError> {
        let mut rows = self.lock()?;
        let id = recommendation.id();
        if rows.contains_key(&id) {
            return Err(StorageError::AlreadyExists { id: id.to_string() });
        }
        rows.insert(id, recommendation.clone());
        Ok(())
    }

    fn update_enrichment(&self, recommendation: &Recommendation) -> Result<(), StorageError> {
        let id = recommendation.id();
        self.merge(recommendation, |stored, incoming| {
            WriteBarrier::merge_enrichment(stored, incoming)
                .map(|_| ())
                .map_err(|e| StorageError::field_conflict(id.to_string(), e))
        })
    }

    fn update_outcome(&self, recommendation: &Recommendation) -> Result<(), StorageError> {
        self.merge(recommendation, |stored, incoming| {
            stored.outcome_status = incoming.outcome_status;
            stored.outcome_recorded_at = incoming.outcome_recorded_at;
            stored.outcome_notes = incoming.outcome_notes.clone();
            stored.calibration_metrics = incoming.calibration_metrics.clone();
            Ok(())
        })
    }

    fn get(&self, id: &RecommendationId) -> Result<Option<Recommendation>, StorageError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn outcomes(&self) -> Result<Vec<OutcomeObservation>, StorageError> {
        let rows = self.lock()?;
        Ok(rows
            .values()
            .filter_map(|rec| {
                let e = rec.enrichment();
                Some(OutcomeObservation {
                    recommendation_id: rec.id(),
                    confidence_score: rec.decision().confidence_score,
                    status: e.outcome_status?,
                    recorded_at: e.outcome_recorded_at?,
                })
            })
            .collect())
    }
}
