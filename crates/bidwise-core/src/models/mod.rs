//! Bidwise data model.
//!
//! Evidence flows forward only: `EvidenceRecord` → `RequirementVerdict` →
//! `ComplianceSummary` → `Recommendation`. Enrichment types hang off the
//! recommendation and are written through the barrier.

pub mod calibration;
pub mod compliance;
pub mod enrichment;
pub mod evidence;
pub mod outcome;
pub mod recommendation;
pub mod risk;
pub mod summary;
pub mod verdict;

pub use calibration::CalibrationMetrics;
pub use compliance::ComplianceLevel;
pub use enrichment::{ClarificationQuestion, EnrichmentRecord, ReflectionFlag, ReflectionNotes};
pub use evidence::{EvidenceDetails, EvidenceRecord, RawEvidence};
pub use outcome::{OutcomeObservation, OutcomeStatus};
pub use recommendation::{
    Decision, DecisionRecord, DecisionSeal, Lifecycle, Recommendation, RecommendationId,
};
pub use risk::{RiskCategory, RiskItem, RiskSeverity};
pub use summary::{ComplianceSummary, LevelCounts};
pub use verdict::RequirementVerdict;
