//! Compliance aggregation: many evidence records → one verdict.

pub mod aggregator;
pub mod rules;

pub use aggregator::{AggregationOutcome, ComplianceAggregator};
pub use rules::{resolve_level, LevelObservation, Resolution, ResolutionRule, RESOLUTION_ORDER};
