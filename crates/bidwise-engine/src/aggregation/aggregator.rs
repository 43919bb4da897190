//! Per-requirement aggregation.

use bidwise_core::errors::EvidenceError;
use bidwise_core::models::{ComplianceLevel, EvidenceRecord, RawEvidence, RequirementVerdict};

use super::rules::{resolve_level, LevelObservation};
use crate::evidence::StatusMap;

/// A verdict plus the raw evidence rejected on the way in.
#[derive(Debug, Clone)]
pub struct AggregationOutcome {
    pub verdict: RequirementVerdict,
    pub rejected: Vec<EvidenceError>,
}

/// Collapses all evidence for one requirement into one verdict.
/// Pure: no I/O, no randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceAggregator;

impl ComplianceAggregator {
    /// Aggregate validated evidence. Evidence order is preserved in the
    /// verdict for audit.
    pub fn aggregate(
        requirement_ref: &str,
        is_mandatory: bool,
        evidence: Vec<EvidenceRecord>,
    ) -> RequirementVerdict {
        let observations: Vec<LevelObservation> = evidence
            .iter()
            .map(|e| LevelObservation::new(e.level(), is_mandatory))
            .collect();
        let resolution = resolve_level(&observations);
        let aggregate_confidence = Self::aggregate_confidence(&evidence);

        tracing::debug!(
            requirement = requirement_ref,
            level = resolution.level.as_str(),
            rule = resolution.rule.as_str(),
            evidence = evidence.len(),
            confidence = aggregate_confidence,
            "requirement aggregated"
        );

        RequirementVerdict {
            requirement_ref: requirement_ref.to_string(),
            is_mandatory,
            aggregate_level: resolution.level,
            aggregate_confidence,
            contributing_evidence: evidence,
        }
    }

    /// Validate raw evidence through the status map, drop what fails, and
    /// aggregate the rest. Never fails: with nothing valid left the verdict
    /// is UNKNOWN.
    pub fn aggregate_raw(
        requirement_ref: &str,
        is_mandatory: bool,
        raw: Vec<RawEvidence>,
        status_map: &StatusMap,
    ) -> AggregationOutcome {
        let mut valid = Vec::with_capacity(raw.len());
        let mut rejected = Vec::new();
        for item in raw {
            let source = item.source.clone();
            match status_map.normalize(item) {
                Ok(record) => valid.push(record),
                Err(e) => {
                    tracing::warn!(
                        requirement = requirement_ref,
                        source = %source,
                        error = %e,
                        "dropping malformed evidence"
                    );
                    rejected.push(e);
                }
            }
        }
        AggregationOutcome {
            verdict: Self::aggregate(requirement_ref, is_mandatory, valid),
            rejected,
        }
    }

    /// Mean confidence over evidence that is not UNKNOWN; `0.0` if none.
    pub fn aggregate_confidence(evidence: &[EvidenceRecord]) -> f64 {
        let known: Vec<f64> = evidence
            .iter()
            .filter(|e| e.level() != ComplianceLevel::Unknown)
            .map(|e| e.confidence())
            .collect();
        if known.is_empty() {
            return 0.0;
        }
        known.iter().sum::<f64>() / known.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::status_map::{CERTIFICATION_CHECKER, TIMELINE_ASSESSOR};

    fn record(source: &str, level: ComplianceLevel, confidence: f64) -> EvidenceRecord {
        EvidenceRecord::new(source, "REQ-1", level, confidence).unwrap()
    }

    #[test]
    fn confidence_ignores_unknown_evidence() {
        let verdict = ComplianceAggregator::aggregate(
            "REQ-1",
            false,
            vec![
                record("a", ComplianceLevel::Compliant, 0.8),
                record("b", ComplianceLevel::Unknown, 0.1),
                record("c", ComplianceLevel::Partial, 0.6),
            ],
        );
        assert!((verdict.aggregate_confidence - 0.7).abs() < 1e-12);
        assert_eq!(verdict.aggregate_level, ComplianceLevel::Unknown);
    }

    #[test]
    fn all_unknown_has_zero_confidence() {
        let verdict = ComplianceAggregator::aggregate(
            "REQ-1",
            true,
            vec![record("a", ComplianceLevel::Unknown, 0.9)],
        );
        assert_eq!(verdict.aggregate_confidence, 0.0);
        assert_eq!(verdict.aggregate_level, ComplianceLevel::Unknown);
    }

    #[test]
    fn evidence_order_is_preserved() {
        let verdict = ComplianceAggregator::aggregate(
            "REQ-1",
            false,
            vec![
                record("z", ComplianceLevel::Compliant, 0.9),
                record("a", ComplianceLevel::Compliant, 0.9),
            ],
        );
        let sources: Vec<&str> = verdict
            .contributing_evidence
            .iter()
            .map(|e| e.source())
            .collect();
        assert_eq!(sources, vec!["z", "a"]);
    }

    #[test]
    fn malformed_evidence_is_dropped_and_reported() {
        let mut good = RawEvidence::new(TIMELINE_ASSESSOR, "REQ-1");
        good.raw_status = "FEASIBLE".into();
        good.confidence = 0.8;
        let mut bad = RawEvidence::new(CERTIFICATION_CHECKER, "REQ-1");
        bad.raw_status = "EXPIRED".into();
        bad.confidence = -0.2;

        let outcome =
            ComplianceAggregator::aggregate_raw("REQ-1", true, vec![good, bad], &StatusMap::builtin());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.verdict.contributing_evidence.len(), 1);
        assert_eq!(outcome.verdict.aggregate_level, ComplianceLevel::Compliant);
    }

    #[test]
    fn nothing_valid_left_is_unknown() {
        let mut bad = RawEvidence::new(CERTIFICATION_CHECKER, "REQ-1");
        bad.level = Some("MAYBE".into());
        bad.confidence = 0.5;
        let outcome =
            ComplianceAggregator::aggregate_raw("REQ-1", false, vec![bad], &StatusMap::builtin());
        assert_eq!(outcome.verdict.aggregate_level, ComplianceLevel::Unknown);
        assert_eq!(outcome.verdict.aggregate_confidence, 0.0);
    }
}
