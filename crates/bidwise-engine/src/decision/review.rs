//! Human review triggers.

use bidwise_core::config::{DecisionConfig, ReviewConfig};
use bidwise_core::models::{ComplianceLevel, ComplianceSummary, Decision, RiskItem, RiskSeverity};

/// Reasons a person must look at this recommendation before acting on it.
/// Empty means no review is required.
pub fn review_reasons(
    summary: &ComplianceSummary,
    decision: Decision,
    score: u8,
    risks: &[RiskItem],
    decision_config: &DecisionConfig,
    review_config: &ReviewConfig,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if summary.total_evaluated == 0 {
        reasons.push("No requirements were evaluated; there is no data to decide on".to_string());
    }

    if summary.mandatory_unknown {
        let refs: Vec<&str> = summary
            .verdicts
            .iter()
            .filter(|v| v.is_mandatory && v.aggregate_level == ComplianceLevel::Unknown)
            .map(|v| v.requirement_ref.as_str())
            .collect();
        reasons.push(format!(
            "Mandatory requirement(s) could not be verified: {}",
            refs.join(", ")
        ));
    }

    if decision == Decision::ConditionalBid {
        reasons.push("Conditional bid requires sign-off on the open conditions".to_string());
    }

    let high = risks
        .iter()
        .filter(|r| r.severity == RiskSeverity::High)
        .count();
    if review_config.high_risk_count > 0 && high >= review_config.high_risk_count {
        reasons.push(format!("{high} high-severity risk(s) identified"));
    }

    let band = review_config.uncertainty_band;
    for (name, threshold) in [
        ("BID", decision_config.bid_threshold),
        ("CONDITIONAL", decision_config.conditional_threshold),
    ] {
        if score.abs_diff(threshold) <= band {
            reasons.push(format!(
                "Confidence score {score} is within {band} points of the {name} threshold ({threshold})"
            ));
        }
    }

    reasons
}
