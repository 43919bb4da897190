//! # bidwise-engine
//!
//! Evidence normalization and parallel collection, the compliance
//! aggregator, the decision engine, the post-decision enrichment
//! orchestrator, calibration, the learning gatekeeper, outcome recording,
//! and the `BidPipeline` façade tying them together.

pub mod aggregation;
pub mod decision;
pub mod enrichment;
pub mod evidence;
pub mod outcome;
pub mod pipeline;
pub mod store;

pub use aggregation::ComplianceAggregator;
pub use decision::DecisionEngine;
pub use enrichment::EnrichmentOrchestrator;
pub use evidence::{EvidenceCollector, StatusMap};
pub use outcome::{LearningGatekeeper, OutcomeRecorder};
pub use pipeline::BidPipeline;
pub use store::MemoryStore;
