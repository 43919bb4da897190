//! Decision matrix, evaluated top to bottom. First matching row wins.

use serde::{Deserialize, Serialize};

use bidwise_core::config::DecisionConfig;
use bidwise_core::models::{ComplianceLevel, ComplianceSummary, Decision};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixRow {
    MandatoryNotMet,
    OverallNonCompliant,
    AboveBidThreshold,
    AboveConditionalThreshold,
    MandatoryUnknown,
    Fallback,
}

pub const DECISION_MATRIX: [MatrixRow; 6] = [
    MatrixRow::MandatoryNotMet,
    MatrixRow::OverallNonCompliant,
    MatrixRow::AboveBidThreshold,
    MatrixRow::AboveConditionalThreshold,
    MatrixRow::MandatoryUnknown,
    MatrixRow::Fallback,
];

impl MatrixRow {
    pub fn matches(&self, summary: &ComplianceSummary, score: u8, config: &DecisionConfig) -> bool {
        match self {
            Self::MandatoryNotMet => !summary.mandatory_met,
            Self::OverallNonCompliant => {
                summary.overall_compliance == ComplianceLevel::NonCompliant
            }
            Self::AboveBidThreshold => {
                score >= config.bid_threshold && summary.overall_compliance.is_passing()
            }
            Self::AboveConditionalThreshold => score >= config.conditional_threshold,
            Self::MandatoryUnknown => {
                summary.overall_compliance == ComplianceLevel::Unknown && summary.mandatory_unknown
            }
            Self::Fallback => true,
        }
    }

    pub fn decision(&self) -> Decision {
        match self {
            Self::MandatoryNotMet | Self::OverallNonCompliant | Self::Fallback => Decision::NoBid,
            Self::AboveBidThreshold => Decision::Bid,
            Self::AboveConditionalThreshold | Self::MandatoryUnknown => Decision::ConditionalBid,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::MandatoryNotMet => "mandatory requirement not met",
            Self::OverallNonCompliant => "overall compliance is NON_COMPLIANT",
            Self::AboveBidThreshold => "score at or above BID threshold with passing compliance",
            Self::AboveConditionalThreshold => "score at or above CONDITIONAL threshold",
            Self::MandatoryUnknown => "mandatory requirement unresolved",
            Self::Fallback => "no other row matched",
        }
    }
}

pub fn determine_recommendation(
    summary: &ComplianceSummary,
    score: u8,
    config: &DecisionConfig,
) -> (Decision, MatrixRow) {
    let row = DECISION_MATRIX
        .iter()
        .copied()
        .find(|row| row.matches(summary, score, config))
        .unwrap_or(MatrixRow::Fallback);
    (row.decision(), row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidwise_core::models::{EvidenceRecord, RequirementVerdict};

    use crate::aggregation::ComplianceAggregator;
    use crate::decision::summarize;

    fn summary_of(levels: &[(bool, ComplianceLevel)]) -> ComplianceSummary {
        let verdicts: Vec<RequirementVerdict> = levels
            .iter()
            .enumerate()
            .map(|(i, (mandatory, level))| {
                let r = format!("R{i}");
                let evidence = EvidenceRecord::new("tool", r.as_str(), *level, 0.9).unwrap();
                ComplianceAggregator::aggregate(&r, *mandatory, vec![evidence])
            })
            .collect();
        summarize(&verdicts)
    }

    #[test]
    fn passing_score_between_thresholds_is_conditional() {
        let summary = summary_of(&[
            (true, ComplianceLevel::Compliant),
            (false, ComplianceLevel::Partial),
        ]);
        let config = DecisionConfig::default();
        assert_eq!(
            determine_recommendation(&summary, 60, &config),
            (Decision::ConditionalBid, MatrixRow::AboveConditionalThreshold)
        );
        assert_eq!(
            determine_recommendation(&summary, 75, &config),
            (Decision::Bid, MatrixRow::AboveBidThreshold)
        );
    }

    #[test]
    fn high_score_without_passing_compliance_is_conditional() {
        let summary = summary_of(&[(false, ComplianceLevel::Warning)]);
        assert_eq!(summary.overall_compliance, ComplianceLevel::Warning);
        assert_eq!(
            determine_recommendation(&summary, 90, &DecisionConfig::default()),
            (Decision::ConditionalBid, MatrixRow::AboveConditionalThreshold)
        );
    }

    #[test]
    fn low_score_rows() {
        let config = DecisionConfig::default();
        let unresolved = summary_of(&[(true, ComplianceLevel::Unknown)]);
        assert_eq!(
            determine_recommendation(&unresolved, 20, &config),
            (Decision::ConditionalBid, MatrixRow::MandatoryUnknown)
        );
        let partial = summary_of(&[(false, ComplianceLevel::Partial)]);
        assert_eq!(
            determine_recommendation(&partial, 49, &config),
            (Decision::NoBid, MatrixRow::Fallback)
        );
        let failed = summary_of(&[(true, ComplianceLevel::NonCompliant)]);
        assert_eq!(
            determine_recommendation(&failed, 99, &config),
            (Decision::NoBid, MatrixRow::MandatoryNotMet)
        );
    }
}
