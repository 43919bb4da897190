//! Compliance summary over all verdicts.

use bidwise_core::models::{ComplianceLevel, ComplianceSummary, LevelCounts, RequirementVerdict};

use crate::aggregation::{resolve_level, LevelObservation};

/// Build the summary. Overall compliance uses the same ordered rules as
/// per-requirement aggregation, applied at verdict level.
pub fn summarize(verdicts: &[RequirementVerdict]) -> ComplianceSummary {
    if verdicts.is_empty() {
        return ComplianceSummary::empty();
    }

    let mut counts = LevelCounts::default();
    for v in verdicts {
        counts.increment(v.aggregate_level);
    }

    let observations: Vec<LevelObservation> = verdicts
        .iter()
        .map(|v| LevelObservation::new(v.aggregate_level, v.is_mandatory))
        .collect();
    let overall = resolve_level(&observations);

    let mandatory_met = !verdicts
        .iter()
        .any(|v| v.is_mandatory && v.aggregate_level == ComplianceLevel::NonCompliant);
    let mandatory_unknown = verdicts
        .iter()
        .any(|v| v.is_mandatory && v.aggregate_level == ComplianceLevel::Unknown);
    let confidence_avg =
        verdicts.iter().map(|v| v.aggregate_confidence).sum::<f64>() / verdicts.len() as f64;

    ComplianceSummary {
        overall_compliance: overall.level,
        counts,
        total_evaluated: verdicts.len(),
        mandatory_met,
        mandatory_unknown,
        confidence_avg,
        verdicts: verdicts.to_vec(),
    }
}
