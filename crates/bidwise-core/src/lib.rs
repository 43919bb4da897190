//! # bidwise-core
//!
//! Foundation crate for the Bidwise bid/no-bid decision engine.
//! Defines the evidence and recommendation model, the enrichment write
//! barrier, collaborator traits, errors, config, tracing, and constants.
//! Every other crate in the workspace depends on this.

pub mod barrier;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod tracing;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use barrier::{EnrichmentField, FieldValue, FieldWriter, WriteBarrier, WriteEffect};
pub use config::BidwiseConfig;
pub use errors::{ErrorCode, PipelineError};
pub use models::{
    ComplianceLevel, ComplianceSummary, Decision, DecisionRecord, EvidenceRecord, Lifecycle,
    OutcomeStatus, RawEvidence, Recommendation, RecommendationId, RequirementVerdict, RiskItem,
    RiskSeverity,
};
