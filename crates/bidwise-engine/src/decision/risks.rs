//! Risk extraction from evidence risk notes.

use std::collections::HashSet;

use bidwise_core::models::{
    ComplianceLevel, EvidenceRecord, RequirementVerdict, RiskCategory, RiskItem, RiskSeverity,
};

use crate::evidence::status_map::{
    BUDGET_ANALYZER, CERTIFICATION_CHECKER, KNOWLEDGE_QUERY, STRATEGY_EVALUATOR, TECH_VALIDATOR,
    TIMELINE_ASSESSOR,
};

/// One risk per distinct note across all evidence, worst first. Ties keep
/// evidence order.
pub fn extract_risks(verdicts: &[RequirementVerdict]) -> Vec<RiskItem> {
    let mut seen = HashSet::new();
    let mut risks = Vec::new();
    for evidence in verdicts.iter().flat_map(|v| v.contributing_evidence.iter()) {
        for note in evidence.risk_notes() {
            let normalized = normalize(note);
            if normalized.is_empty() || !seen.insert(normalized) {
                continue;
            }
            risks.push(RiskItem::new(
                severity_for(evidence),
                note.trim(),
                evidence.source(),
                category_for(evidence.source()),
            ));
        }
    }
    risks.sort_by_key(|r| r.severity);
    risks
}

fn severity_for(evidence: &EvidenceRecord) -> RiskSeverity {
    match evidence.level() {
        ComplianceLevel::NonCompliant => RiskSeverity::High,
        ComplianceLevel::Warning => RiskSeverity::Medium,
        ComplianceLevel::Partial if evidence.confidence() < 0.5 => RiskSeverity::Medium,
        _ => RiskSeverity::Low,
    }
}

pub fn category_for(source: &str) -> RiskCategory {
    match source {
        CERTIFICATION_CHECKER => RiskCategory::Compliance,
        TECH_VALIDATOR => RiskCategory::Technical,
        BUDGET_ANALYZER => RiskCategory::Budget,
        TIMELINE_ASSESSOR => RiskCategory::Timeline,
        STRATEGY_EVALUATOR => RiskCategory::Strategic,
        KNOWLEDGE_QUERY => RiskCategory::Resource,
        _ => RiskCategory::Resource,
    }
}

fn normalize(note: &str) -> String {
    note.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::ComplianceAggregator;

    #[test]
    fn risks_are_deduplicated_and_sorted() {
        let low = EvidenceRecord::new(STRATEGY_EVALUATOR, "R1", ComplianceLevel::Compliant, 0.9)
            .unwrap()
            .with_risk_note("Client is new to us");
        let high = EvidenceRecord::new(BUDGET_ANALYZER, "R2", ComplianceLevel::NonCompliant, 0.8)
            .unwrap()
            .with_risk_note("Budget exceeds  maximum")
            .with_risk_note("client is NEW to us");
        let verdicts = vec![
            ComplianceAggregator::aggregate("R1", false, vec![low]),
            ComplianceAggregator::aggregate("R2", false, vec![high]),
        ];

        let risks = extract_risks(&verdicts);
        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0].severity, RiskSeverity::High);
        assert_eq!(risks[0].category, RiskCategory::Budget);
        assert_eq!(risks[1].description, "Client is new to us");
        assert_eq!(risks[1].category, RiskCategory::Strategic);
    }

    #[test]
    fn low_confidence_partial_is_medium() {
        let e = EvidenceRecord::new(TECH_VALIDATOR, "R", ComplianceLevel::Partial, 0.3).unwrap();
        assert_eq!(severity_for(&e), RiskSeverity::Medium);
    }
}
