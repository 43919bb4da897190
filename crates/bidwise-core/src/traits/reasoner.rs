use crate::errors::EnrichmentError;
use crate::models::{Recommendation, ReflectionNotes};

/// Explains which verdicts drove a finalized decision. Read-only with
/// respect to the recommendation.
pub trait ReflectionReasoner: Send + Sync {
    fn reflect(&self, recommendation: &Recommendation) -> Result<ReflectionNotes, EnrichmentError>;

    fn name(&self) -> &str;
}
