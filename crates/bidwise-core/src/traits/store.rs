//! Recommendation persistence.

use crate::errors::StorageError;
use crate::models::{OutcomeObservation, Recommendation, RecommendationId};

/// Single-writer-per-transition persistence of recommendations.
pub trait RecommendationStore: Send + Sync {
    /// Create the row. Fails with `AlreadyExists` if the id is taken;
    /// decision fields are written exactly once.
    fn insert_finalized(&self, recommendation: &Recommendation) -> Result<(), StorageError>;

    /// Persist enrichment fields and lifecycle. Decision fields are untouched.
    fn update_enrichment(&self, recommendation: &Recommendation) -> Result<(), StorageError>;

    /// Persist outcome fields, calibration metrics, and lifecycle.
    fn update_outcome(&self, recommendation: &Recommendation) -> Result<(), StorageError>;

    fn get(&self, id: &RecommendationId) -> Result<Option<Recommendation>, StorageError>;

    /// One observation per recommendation with a recorded outcome.
    fn outcomes(&self) -> Result<Vec<OutcomeObservation>, StorageError>;
}
