//! Reflection: which verdicts drove the decision, and does the decision
//! look consistent with them.

use std::sync::Arc;

use bidwise_core::barrier::FieldValue;
use bidwise_core::errors::EnrichmentError;
use bidwise_core::models::{
    ComplianceLevel, Decision, Recommendation, ReflectionFlag, ReflectionNotes, RequirementVerdict,
    RiskSeverity,
};
use bidwise_core::traits::ReflectionReasoner;

use super::step::{EnrichmentStep, StepId};

const OVERCONFIDENCE_SCORE: u8 = 85;
const HIGH_UNCERTAINTY_RATIO: f64 = 0.25;
const CONSERVATIVE_COMPLIANT_RATIO: f64 = 0.8;
const AGGRESSIVE_NON_COMPLIANT_RATIO: f64 = 0.3;
const MAX_DRIVERS: usize = 5;

/// Deterministic rule-based reasoner.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleReasoner;

impl ReflectionReasoner for RuleReasoner {
    fn reflect(&self, recommendation: &Recommendation) -> Result<ReflectionNotes, EnrichmentError> {
        let d = recommendation.decision();
        let summary = &d.compliance_summary;
        let high_risks = d
            .risks
            .iter()
            .filter(|r| r.severity == RiskSeverity::High)
            .count();

        let mut flags = Vec::new();
        let mut observations = Vec::new();

        if d.confidence_score > OVERCONFIDENCE_SCORE && high_risks > 0 {
            flags.push(ReflectionFlag::OverconfidenceRisk);
            observations.push(format!(
                "Score {} is high despite {high_risks} high-severity risk(s)",
                d.confidence_score
            ));
        }
        let unknown_ratio = summary.ratio(ComplianceLevel::Unknown);
        if unknown_ratio > HIGH_UNCERTAINTY_RATIO {
            flags.push(ReflectionFlag::HighUncertainty);
            observations.push(format!(
                "{:.0}% of requirements could not be verified",
                unknown_ratio * 100.0
            ));
        }
        if d.decision == Decision::NoBid
            && summary.ratio(ComplianceLevel::Compliant) > CONSERVATIVE_COMPLIANT_RATIO
            && d.risks.is_empty()
        {
            flags.push(ReflectionFlag::ConservativeDecision);
            observations.push(
                "NO_BID although most requirements are compliant and no risks were found"
                    .to_string(),
            );
        }
        let non_compliant_ratio = summary.ratio(ComplianceLevel::NonCompliant);
        if d.decision == Decision::Bid && non_compliant_ratio > AGGRESSIVE_NON_COMPLIANT_RATIO {
            flags.push(ReflectionFlag::AggressiveDecision);
            observations.push(format!(
                "BID although {:.0}% of requirements are non-compliant",
                non_compliant_ratio * 100.0
            ));
        }
        if d.requires_human_review {
            observations.push(format!(
                "Human review requested: {}",
                d.review_reasons.join("; ")
            ));
        }

        let drivers = decision_drivers(&summary.verdicts);
        let consistency_score = (1.0 - 0.25 * flags.len() as f64).max(0.0);
        let headline = drivers
            .first()
            .cloned()
            .unwrap_or_else(|| "no requirements evaluated".to_string());

        Ok(ReflectionNotes {
            summary: format!("{} at {}/100: {headline}", d.decision, d.confidence_score),
            drivers,
            flags,
            observations,
            consistency_score,
            reasoner: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        "rule-reasoner"
    }
}

/// Verdicts that pushed the decision away from a clean BID, worst first:
/// mandatory before optional, then by level severity. When every verdict
/// is compliant that fact is the driver.
fn decision_drivers(verdicts: &[RequirementVerdict]) -> Vec<String> {
    let mut adverse: Vec<&RequirementVerdict> = verdicts
        .iter()
        .filter(|v| v.aggregate_level != ComplianceLevel::Compliant)
        .collect();
    if adverse.is_empty() {
        if verdicts.is_empty() {
            return Vec::new();
        }
        return vec![format!("all {} requirement(s) compliant", verdicts.len())];
    }
    adverse.sort_by_key(|v| (!v.is_mandatory, severity_rank(v.aggregate_level)));
    adverse
        .into_iter()
        .take(MAX_DRIVERS)
        .map(|v| {
            let kind = if v.is_mandatory { "mandatory" } else { "optional" };
            let state = match v.aggregate_level {
                ComplianceLevel::NonCompliant => "not met",
                ComplianceLevel::Unknown => "unresolved",
                ComplianceLevel::Warning => "at risk",
                ComplianceLevel::Partial => "partially met",
                ComplianceLevel::Compliant => "met",
            };
            format!(
                "{kind} {} {state} (confidence {:.2})",
                v.requirement_ref, v.aggregate_confidence
            )
        })
        .collect()
}

fn severity_rank(level: ComplianceLevel) -> u8 {
    match level {
        ComplianceLevel::NonCompliant => 0,
        ComplianceLevel::Unknown => 1,
        ComplianceLevel::Warning => 2,
        ComplianceLevel::Partial => 3,
        ComplianceLevel::Compliant => 4,
    }
}

/// Writes `reflection_notes`. Skipped by the orchestrator when notes are
/// already present.
pub struct ReflectionStep {
    reasoner: Arc<dyn ReflectionReasoner>,
}

impl ReflectionStep {
    pub fn new(reasoner: Arc<dyn ReflectionReasoner>) -> Self {
        Self { reasoner }
    }
}

impl EnrichmentStep for ReflectionStep {
    fn id(&self) -> StepId {
        StepId::Reflection
    }

    fn run(&self, recommendation: &Recommendation) -> Result<FieldValue, EnrichmentError> {
        self.reasoner
            .reflect(recommendation)
            .map(FieldValue::ReflectionNotes)
    }
}
