//! Error handling for Bidwise.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod barrier_error;
pub mod config_error;
pub mod decision_error;
pub mod enrichment_error;
pub mod error_code;
pub mod evidence_error;
pub mod justification_error;
pub mod outcome_error;
pub mod pipeline_error;
pub mod storage_error;

pub use barrier_error::BarrierError;
pub use config_error::ConfigError;
pub use decision_error::DecisionError;
pub use enrichment_error::EnrichmentError;
pub use error_code::ErrorCode;
pub use evidence_error::EvidenceError;
pub use justification_error::JustificationError;
pub use outcome_error::OutcomeError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use storage_error::StorageError;
