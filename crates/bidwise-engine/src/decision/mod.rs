//! Decision engine: verdicts → summary → score → decision → review flags.
//!
//! Everything except justification text is a pure function of the verdicts
//! and config. Justification is delegated to a `JustificationWriter` with a
//! deterministic template fallback.

pub mod engine;
pub mod justification;
pub mod matrix;
pub mod review;
pub mod risks;
pub mod scoring;
pub mod summary;
pub mod trace;

pub use engine::{Decided, DecisionEngine, DecisionOutcome};
pub use justification::TemplateJustifier;
pub use matrix::{determine_recommendation, MatrixRow, DECISION_MATRIX};
pub use review::review_reasons;
pub use risks::extract_risks;
pub use scoring::{calculate_confidence_score, ScoreBreakdown};
pub use summary::summarize;
pub use trace::DecisionTrace;
