//! Per-requirement aggregate verdict.

use serde::{Deserialize, Serialize};

use super::{ComplianceLevel, EvidenceRecord};

/// The aggregator's verdict for one requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementVerdict {
    pub requirement_ref: String,
    pub is_mandatory: bool,
    pub aggregate_level: ComplianceLevel,
    /// Mean confidence over non-UNKNOWN evidence, `0.0` when there is none.
    pub aggregate_confidence: f64,
    /// Contributing evidence in arrival order.
    pub contributing_evidence: Vec<EvidenceRecord>,
}

impl RequirementVerdict {
    /// Evidence from `source`, if any contributed.
    pub fn evidence_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a EvidenceRecord> {
        self.contributing_evidence
            .iter()
            .filter(move |e| e.source() == source)
    }
}
