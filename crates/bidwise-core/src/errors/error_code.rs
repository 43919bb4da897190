//! Stable error codes surfaced to callers and logs.

/// Every subsystem error maps to exactly one stable code.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const EVIDENCE_INVALID: &str = "EVIDENCE_INVALID";
pub const DECISION_ERROR: &str = "DECISION_ERROR";
pub const JUSTIFICATION_FAILED: &str = "JUSTIFICATION_FAILED";
pub const ENRICHMENT_FAILED: &str = "ENRICHMENT_FAILED";
pub const WRITE_BARRIER_VIOLATION: &str = "WRITE_BARRIER_VIOLATION";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const OUTCOME_ERROR: &str = "OUTCOME_ERROR";
pub const CANCELLED: &str = "CANCELLED";
