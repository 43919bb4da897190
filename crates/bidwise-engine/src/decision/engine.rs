//! The decision engine.

use std::sync::Arc;

use bidwise_core::config::{BidwiseConfig, DecisionConfig, ReviewConfig};
use bidwise_core::errors::{DecisionError, JustificationError};
use bidwise_core::models::{
    ComplianceSummary, Decision, DecisionRecord, Recommendation, RequirementVerdict, RiskItem,
};
use bidwise_core::traits::{Clock, JustificationRequest, JustificationWriter, SystemClock};

use super::justification::{justify, TemplateJustifier};
use super::matrix::{determine_recommendation, MatrixRow};
use super::review::review_reasons;
use super::risks::extract_risks;
use super::scoring::{calculate_confidence_score, ScoreBreakdown};
use super::summary::summarize;
use super::trace::DecisionTrace;

/// Everything the engine derives from the verdicts, before any text.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub summary: ComplianceSummary,
    pub risks: Vec<RiskItem>,
    pub score: ScoreBreakdown,
    pub decision: Decision,
    pub matrix_row: MatrixRow,
    pub review_reasons: Vec<String>,
    pub trace: DecisionTrace,
}

impl DecisionOutcome {
    pub fn requires_human_review(&self) -> bool {
        !self.review_reasons.is_empty()
    }
}

/// A finalized recommendation plus how it was reached.
#[derive(Debug)]
pub struct Decided {
    pub recommendation: Recommendation,
    pub trace: DecisionTrace,
    /// Set when the writer failed and the template was used instead.
    pub justification_error: Option<JustificationError>,
}

pub struct DecisionEngine {
    decision_config: DecisionConfig,
    review_config: ReviewConfig,
    writer: Arc<dyn JustificationWriter>,
    clock: Arc<dyn Clock>,
}

impl DecisionEngine {
    /// Engine with the template writer and the system clock.
    pub fn new(config: &BidwiseConfig) -> Self {
        Self {
            decision_config: config.decision.clone(),
            review_config: config.review.clone(),
            writer: Arc::new(TemplateJustifier),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_writer(mut self, writer: Arc<dyn JustificationWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn decision_config(&self) -> &DecisionConfig {
        &self.decision_config
    }

    /// Pure part of the decision: summary, risks, score, matrix row, and
    /// review flags. Never fails; zero verdicts yield UNKNOWN compliance and
    /// a review flag.
    pub fn evaluate(&self, verdicts: &[RequirementVerdict]) -> DecisionOutcome {
        let mut trace = DecisionTrace::new();
        let summary = summarize(verdicts);
        trace.push(format!(
            "summary: {} requirement(s), overall {}, mandatory_met={}, mandatory_unknown={}, mean confidence {:.3}",
            summary.total_evaluated,
            summary.overall_compliance,
            summary.mandatory_met,
            summary.mandatory_unknown,
            summary.confidence_avg,
        ));

        let risks = extract_risks(verdicts);
        let score = calculate_confidence_score(&summary, &risks, &self.decision_config);
        trace.push(format!("score: base {} for {}", score.base, summary.overall_compliance));
        trace.push(format!("score: mandatory adjustment {:+}", score.mandatory_adjustment));
        trace.push(format!(
            "score: confidence term {:+.2} (mean {:.3} vs baseline {:.2})",
            score.confidence_term, summary.confidence_avg, self.decision_config.confidence_baseline
        ));
        trace.push(format!(
            "score: penalties {} (levels {} + risks {}, cap {})",
            score.penalty_applied,
            score.level_penalty,
            score.risk_penalty,
            self.decision_config.max_penalty_cap
        ));
        trace.push(format!("score: raw {:.2} -> {}", score.raw, score.score));

        let (decision, matrix_row) =
            determine_recommendation(&summary, score.score, &self.decision_config);
        trace.push(format!("matrix: {} -> {}", matrix_row.describe(), decision));

        let review_reasons = review_reasons(
            &summary,
            decision,
            score.score,
            &risks,
            &self.decision_config,
            &self.review_config,
        );
        for reason in &review_reasons {
            trace.push(format!("review: {reason}"));
        }

        DecisionOutcome {
            summary,
            risks,
            score,
            decision,
            matrix_row,
            review_reasons,
            trace,
        }
    }

    /// Evaluate, narrate, and seal a `FINALIZED` recommendation.
    pub fn decide(&self, verdicts: &[RequirementVerdict]) -> Result<Decided, DecisionError> {
        let outcome = self.evaluate(verdicts);
        let request = JustificationRequest {
            decision: outcome.decision,
            confidence_score: outcome.score.score,
            summary: &outcome.summary,
            risks: &outcome.risks,
            review_reasons: &outcome.review_reasons,
        };
        let (text, justification_error) = justify(
            &self.writer,
            &request,
            self.decision_config.justification_timeout(),
        );
        let mut trace = outcome.trace;
        if justification_error.is_some() {
            trace.push("justification: writer failed, template used");
        }

        let requires_human_review = !outcome.review_reasons.is_empty();
        let record = DecisionRecord {
            decision: outcome.decision,
            confidence_score: outcome.score.score,
            justification: text.justification,
            executive_summary: text.executive_summary,
            risks: outcome.risks,
            compliance_summary: outcome.summary,
            requires_human_review,
            review_reasons: outcome.review_reasons,
            created_at: self.clock.now(),
        };
        let recommendation = Recommendation::finalize(record)?;

        tracing::info!(
            recommendation_id = %recommendation.id(),
            decision = recommendation.decision().decision.as_str(),
            confidence_score = recommendation.decision().confidence_score,
            requires_human_review,
            "recommendation finalized"
        );

        Ok(Decided {
            recommendation,
            trace,
            justification_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidwise_core::models::{ComplianceLevel, EvidenceRecord};

    use crate::aggregation::ComplianceAggregator;

    fn verdict(r: &str, mandatory: bool, level: ComplianceLevel, c: f64) -> RequirementVerdict {
        ComplianceAggregator::aggregate(
            r,
            mandatory,
            vec![EvidenceRecord::new("tool", r, level, c).unwrap()],
        )
    }

    #[test]
    fn empty_input_is_unknown_and_flagged() {
        let engine = DecisionEngine::new(&BidwiseConfig::default());
        let outcome = engine.evaluate(&[]);
        assert_eq!(outcome.summary.overall_compliance, ComplianceLevel::Unknown);
        assert!(outcome.summary.mandatory_met);
        assert!(outcome.requires_human_review());
    }

    #[test]
    fn trace_names_the_matrix_row() {
        let engine = DecisionEngine::new(&BidwiseConfig::default());
        let outcome = engine.evaluate(&[verdict("R1", true, ComplianceLevel::NonCompliant, 0.9)]);
        assert_eq!(outcome.matrix_row, MatrixRow::MandatoryNotMet);
        assert!(outcome
            .trace
            .lines()
            .iter()
            .any(|l| l.contains("mandatory requirement not met")));
    }
}
