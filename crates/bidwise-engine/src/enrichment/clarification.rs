//! Rule-based clarification questions.
//!
//! Nine uncertainty triggers are checked in a fixed order against the
//! recommendation's verdicts and risks. Each trigger that fires yields one
//! question; questions are deduplicated by trigger key. No learned component.

use std::collections::HashSet;

use bidwise_core::barrier::FieldValue;
use bidwise_core::config::EnrichmentConfig;
use bidwise_core::errors::EnrichmentError;
use bidwise_core::models::{
    ClarificationQuestion, ComplianceLevel, EvidenceRecord, Recommendation, RequirementVerdict,
    RiskCategory, RiskItem, RiskSeverity,
};

use super::step::{EnrichmentStep, StepId};
use crate::evidence::status_map::{
    BUDGET_ANALYZER, CERTIFICATION_CHECKER, STRATEGY_EVALUATOR, TECH_VALIDATOR, TIMELINE_ASSESSOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClarificationTrigger {
    MandatoryCertificationUnknown,
    TightTimeline,
    BudgetNearCeiling,
    TechStackUnseen,
    ExperienceDomainUnmatched,
    ConflictingEvidence,
    LowConfidenceMandatory,
    MissingGeographicData,
    StaleCapabilityData,
}

pub const TRIGGER_ORDER: [ClarificationTrigger; 9] = [
    ClarificationTrigger::MandatoryCertificationUnknown,
    ClarificationTrigger::TightTimeline,
    ClarificationTrigger::BudgetNearCeiling,
    ClarificationTrigger::TechStackUnseen,
    ClarificationTrigger::ExperienceDomainUnmatched,
    ClarificationTrigger::ConflictingEvidence,
    ClarificationTrigger::LowConfidenceMandatory,
    ClarificationTrigger::MissingGeographicData,
    ClarificationTrigger::StaleCapabilityData,
];

impl ClarificationTrigger {
    pub fn key(&self) -> &'static str {
        match self {
            Self::MandatoryCertificationUnknown => "mandatory_certification_unknown",
            Self::TightTimeline => "tight_timeline",
            Self::BudgetNearCeiling => "budget_near_ceiling",
            Self::TechStackUnseen => "tech_stack_unseen",
            Self::ExperienceDomainUnmatched => "experience_domain_unmatched",
            Self::ConflictingEvidence => "conflicting_evidence",
            Self::LowConfidenceMandatory => "low_confidence_mandatory",
            Self::MissingGeographicData => "missing_geographic_data",
            Self::StaleCapabilityData => "stale_capability_data",
        }
    }
}

/// Writes `clarification_questions`. An empty list means the rules ran and
/// found nothing to ask.
#[derive(Debug, Clone)]
pub struct ClarificationStep {
    low_confidence_threshold: f64,
    stale_after_days: u64,
}

impl ClarificationStep {
    pub fn new(config: &EnrichmentConfig) -> Self {
        Self {
            low_confidence_threshold: config.low_confidence_mandatory,
            stale_after_days: config.stale_capability_days,
        }
    }

    pub fn questions(&self, recommendation: &Recommendation) -> Vec<ClarificationQuestion> {
        let d = recommendation.decision();
        let verdicts = &d.compliance_summary.verdicts;
        let candidates = TRIGGER_ORDER.into_iter().filter_map(|trigger| {
            let refs = self.matches(trigger, verdicts, &d.risks)?;
            Some(ClarificationQuestion {
                trigger: trigger.key().to_string(),
                question: self.question(trigger, &refs),
                requirement_ref: refs.first().map(|r| r.to_string()),
            })
        });
        dedupe_by_trigger(candidates)
    }

    /// Requirement refs the trigger fired on, or `None` if it did not fire.
    /// Risk-driven triggers may fire with no refs.
    fn matches<'a>(
        &self,
        trigger: ClarificationTrigger,
        verdicts: &'a [RequirementVerdict],
        risks: &[RiskItem],
    ) -> Option<Vec<&'a str>> {
        let refs = match trigger {
            ClarificationTrigger::MandatoryCertificationUnknown => refs_where(verdicts, |v| {
                v.is_mandatory
                    && v
                        .evidence_from(CERTIFICATION_CHECKER)
                        .any(|e| e.level() == ComplianceLevel::Unknown)
            }),
            ClarificationTrigger::TightTimeline => {
                let refs = refs_with_evidence(verdicts, TIMELINE_ASSESSOR, &[ComplianceLevel::Warning]);
                if refs.is_empty() && !has_risk(risks, RiskCategory::Timeline) {
                    return None;
                }
                return Some(refs);
            }
            ClarificationTrigger::BudgetNearCeiling => {
                let refs = refs_with_evidence(verdicts, BUDGET_ANALYZER, &[ComplianceLevel::Warning]);
                if refs.is_empty() && !has_risk(risks, RiskCategory::Budget) {
                    return None;
                }
                return Some(refs);
            }
            ClarificationTrigger::TechStackUnseen => refs_with_evidence(
                verdicts,
                TECH_VALIDATOR,
                &[ComplianceLevel::Unknown, ComplianceLevel::Partial],
            ),
            ClarificationTrigger::ExperienceDomainUnmatched => refs_with_evidence(
                verdicts,
                STRATEGY_EVALUATOR,
                &[ComplianceLevel::Unknown, ComplianceLevel::Warning],
            ),
            ClarificationTrigger::ConflictingEvidence => {
                refs_where(verdicts, |v| has_conflict(&v.contributing_evidence))
            }
            ClarificationTrigger::LowConfidenceMandatory => refs_where(verdicts, |v| {
                v.is_mandatory && v.aggregate_confidence < self.low_confidence_threshold
            }),
            ClarificationTrigger::MissingGeographicData => refs_where(verdicts, |v| {
                v.contributing_evidence.iter().any(missing_region)
            }),
            ClarificationTrigger::StaleCapabilityData => refs_where(verdicts, |v| {
                v.contributing_evidence
                    .iter()
                    .any(|e| is_stale(e, self.stale_after_days))
            }),
        };
        if refs.is_empty() {
            None
        } else {
            Some(refs)
        }
    }

    fn question(&self, trigger: ClarificationTrigger, refs: &[&str]) -> String {
        let listed = refs.join(", ");
        let scope = if refs.is_empty() {
            String::new()
        } else {
            format!(" for {listed}")
        };
        match trigger {
            ClarificationTrigger::MandatoryCertificationUnknown => format!(
                "Can you provide current proof of the certification required by {listed}? No verification source could confirm it."
            ),
            ClarificationTrigger::TightTimeline => format!(
                "Is there flexibility in the delivery timeline{scope}? The assessed schedule is tighter than our historical delivery pace."
            ),
            ClarificationTrigger::BudgetNearCeiling => format!(
                "Is the budget ceiling{scope} firm? Our estimate sits close to or beyond it."
            ),
            ClarificationTrigger::TechStackUnseen => format!(
                "Which parts of the required technology stack{scope} has the team delivered with before?"
            ),
            ClarificationTrigger::ExperienceDomainUnmatched => format!(
                "Do we have reference projects in this client's domain{scope}? Strategic fit could not be confirmed."
            ),
            ClarificationTrigger::ConflictingEvidence => format!(
                "Verification sources disagree on {listed}. Which assessment reflects the current state?"
            ),
            ClarificationTrigger::LowConfidenceMandatory => format!(
                "Mandatory requirement(s) {listed} were verified with low confidence. Can supporting evidence be supplied?"
            ),
            ClarificationTrigger::MissingGeographicData => format!(
                "Where will the work be performed{scope}? Location or data residency information is missing."
            ),
            ClarificationTrigger::StaleCapabilityData => format!(
                "Is the capability data behind {listed} still current? Some of it is older than {} days.",
                self.stale_after_days
            ),
        }
    }
}

impl EnrichmentStep for ClarificationStep {
    fn id(&self) -> StepId {
        StepId::Clarification
    }

    fn run(&self, recommendation: &Recommendation) -> Result<FieldValue, EnrichmentError> {
        Ok(FieldValue::ClarificationQuestions(
            self.questions(recommendation),
        ))
    }
}

fn refs_where(
    verdicts: &[RequirementVerdict],
    pred: impl Fn(&RequirementVerdict) -> bool,
) -> Vec<&str> {
    verdicts
        .iter()
        .filter(|v| pred(*v))
        .map(|v| v.requirement_ref.as_str())
        .collect()
}

fn refs_with_evidence<'a>(
    verdicts: &'a [RequirementVerdict],
    source: &str,
    levels: &[ComplianceLevel],
) -> Vec<&'a str> {
    refs_where(verdicts, |v| {
        v.evidence_from(source).any(|e| levels.contains(&e.level()))
    })
}

fn has_risk(risks: &[RiskItem], category: RiskCategory) -> bool {
    risks
        .iter()
        .any(|r| r.category == category && r.severity != RiskSeverity::Low)
}

/// A passing and a failing assessment from two different sources.
fn has_conflict(evidence: &[EvidenceRecord]) -> bool {
    evidence.iter().any(|pass| {
        pass.level().is_passing()
            && evidence.iter().any(|fail| {
                fail.level() == ComplianceLevel::NonCompliant && fail.source() != pass.source()
            })
    })
}

fn missing_region(evidence: &EvidenceRecord) -> bool {
    if evidence.raw_status().eq_ignore_ascii_case("GEOGRAPHY_UNKNOWN") {
        return true;
    }
    match evidence.details().get("region") {
        Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn is_stale(evidence: &EvidenceRecord, stale_after_days: u64) -> bool {
    if evidence.raw_status().eq_ignore_ascii_case("STALE") {
        return true;
    }
    evidence
        .details()
        .get("data_age_days")
        .and_then(serde_json::Value::as_f64)
        .is_some_and(|age| age > stale_after_days as f64)
}

/// Keep the first question per normalized trigger key, in order.
pub fn dedupe_by_trigger(
    questions: impl IntoIterator<Item = ClarificationQuestion>,
) -> Vec<ClarificationQuestion> {
    let mut seen = HashSet::new();
    questions
        .into_iter()
        .filter(|q| seen.insert(normalize_key(&q.trigger)))
        .collect()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}
