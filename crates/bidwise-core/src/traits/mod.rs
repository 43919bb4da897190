//! Collaborator traits. Every external dependency of the decision engine and
//! the enrichment orchestrator is injected through one of these.

pub mod cancellation;
pub mod clock;
pub mod embedding;
pub mod justification;
pub mod reasoner;
pub mod store;
pub mod verification;

pub use cancellation::{Cancellable, CancellationToken};
pub use clock::{Clock, FixedClock, SystemClock};
pub use embedding::EmbeddingProvider;
pub use justification::{Justification, JustificationRequest, JustificationWriter};
pub use reasoner::ReflectionReasoner;
pub use store::RecommendationStore;
pub use verification::{RequirementSpec, VerificationTool};
