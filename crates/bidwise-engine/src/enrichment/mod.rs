//! Post-decision enrichment.
//!
//! A fixed sequence of failure-isolated steps runs over a `FINALIZED`
//! recommendation. Each step owns exactly one field and writes it through
//! the barrier; nothing here can reach the decision fields.

pub mod clarification;
pub mod embedding;
pub mod orchestrator;
pub mod reflection;
pub mod step;

pub use clarification::{ClarificationStep, ClarificationTrigger};
pub use embedding::{EmbeddingStep, HashedTermEmbedder};
pub use orchestrator::EnrichmentOrchestrator;
pub use reflection::{ReflectionStep, RuleReasoner};
pub use step::{EnrichmentReport, EnrichmentStep, StepId, StepOutcome, StepStatus};
