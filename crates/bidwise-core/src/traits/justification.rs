//! Natural-language justification collaborator.

use crate::errors::JustificationError;
use crate::models::{ComplianceSummary, Decision, RiskItem};

/// Decision-owned, non-text fields a writer must narrate.
#[derive(Debug, Clone, Copy)]
pub struct JustificationRequest<'a> {
    pub decision: Decision,
    pub confidence_score: u8,
    pub summary: &'a ComplianceSummary,
    pub risks: &'a [RiskItem],
    pub review_reasons: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Justification {
    pub justification: String,
    pub executive_summary: String,
}

/// Produces the justification and executive summary for a decision.
/// Failures are never fatal; the caller substitutes a template.
pub trait JustificationWriter: Send + Sync {
    fn write(&self, request: &JustificationRequest<'_>) -> Result<Justification, JustificationError>;

    fn name(&self) -> &str;
}
