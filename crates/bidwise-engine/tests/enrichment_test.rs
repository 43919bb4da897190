//! Enrichment orchestrator tests: isolation, timeouts, idempotence,
//! cancellation, and seal checks.

use std::sync::Arc;
use std::time::Duration;

use bidwise_core::barrier::FieldValue;
use bidwise_core::config::BidwiseConfig;
use bidwise_core::errors::EnrichmentError;
use bidwise_core::models::{ComplianceLevel, EvidenceRecord, Lifecycle, Recommendation};
use bidwise_core::traits::{Cancellable, CancellationToken};
use bidwise_engine::enrichment::{
    ClarificationStep, EmbeddingStep, EnrichmentOrchestrator, EnrichmentStep, HashedTermEmbedder,
    ReflectionStep, RuleReasoner, StepId, StepStatus,
};
use bidwise_engine::{ComplianceAggregator, DecisionEngine};

fn make_recommendation() -> Recommendation {
    let config = BidwiseConfig::default();
    let verdicts = vec![
        ComplianceAggregator::aggregate(
            "REQ-1",
            true,
            vec![EvidenceRecord::new("certification_checker", "REQ-1", ComplianceLevel::Compliant, 0.9).unwrap()],
        ),
        ComplianceAggregator::aggregate(
            "REQ-2",
            false,
            vec![EvidenceRecord::new("budget_analyzer", "REQ-2", ComplianceLevel::Warning, 0.6)
                .unwrap()
                .with_risk_note("Budget ceiling is below estimated cost")],
        ),
        ComplianceAggregator::aggregate(
            "REQ-3",
            false,
            vec![EvidenceRecord::new("knowledge_query", "REQ-3", ComplianceLevel::Unknown, 0.0).unwrap()],
        ),
    ];
    DecisionEngine::new(&config).decide(&verdicts).unwrap().recommendation
}

fn make_steps(config: &BidwiseConfig) -> Vec<Arc<dyn EnrichmentStep>> {
    vec![
        Arc::new(ReflectionStep::new(Arc::new(RuleReasoner))),
        Arc::new(ClarificationStep::new(&config.enrichment)),
        Arc::new(EmbeddingStep::new(
            Arc::new(HashedTermEmbedder::new(config.enrichment.embedding_dimensions)),
            config.enrichment.embedding_dimensions,
        )),
    ]
}

fn make_orchestrator(steps: Vec<Arc<dyn EnrichmentStep>>) -> EnrichmentOrchestrator {
    EnrichmentOrchestrator::with_steps(steps, &BidwiseConfig::default())
        .with_timeout(Duration::from_secs(2))
        .with_budget(Duration::from_secs(10))
}

struct PanickingStep;

impl EnrichmentStep for PanickingStep {
    fn id(&self) -> StepId {
        StepId::Reflection
    }

    fn run(&self, _: &Recommendation) -> Result<FieldValue, EnrichmentError> {
        panic!("reasoner crashed");
    }
}

struct SlowStep(Duration);

impl EnrichmentStep for SlowStep {
    fn id(&self) -> StepId {
        StepId::Clarification
    }

    fn run(&self, _: &Recommendation) -> Result<FieldValue, EnrichmentError> {
        std::thread::sleep(self.0);
        Ok(FieldValue::ClarificationQuestions(Vec::new()))
    }
}

/// Claims to be the reflection step but writes the embedding.
struct TrespassingStep;

impl EnrichmentStep for TrespassingStep {
    fn id(&self) -> StepId {
        StepId::Reflection
    }

    fn run(&self, _: &Recommendation) -> Result<FieldValue, EnrichmentError> {
        Ok(FieldValue::Embedding(vec![0.0; 4]))
    }
}

#[test]
fn standard_run_fills_every_field() {
    let config = BidwiseConfig::default();
    let rec = make_recommendation();
    let (enriched, report) = make_orchestrator(make_steps(&config)).enrich(rec.clone(), &CancellationToken::new());

    assert!(report.is_clean());
    assert_eq!(report.applied_count(), 3);
    assert_eq!(enriched.lifecycle(), Lifecycle::Enriched);
    let e = enriched.enrichment();
    assert!(e.reflection_notes.is_some());
    assert!(!e.clarification_questions.as_ref().unwrap().is_empty());
    assert_eq!(e.embedding.as_ref().unwrap().len(), config.enrichment.embedding_dimensions);
    assert_eq!(enriched.decision(), rec.decision());
}

/// A panicking step is contained and later steps still run.
#[test]
fn panicking_step_is_isolated() {
    let config = BidwiseConfig::default();
    let mut steps = make_steps(&config);
    steps[0] = Arc::new(PanickingStep);
    let (enriched, report) = make_orchestrator(steps).enrich(make_recommendation(), &CancellationToken::new());

    assert!(matches!(
        report.outcome(StepId::Reflection).unwrap().status,
        StepStatus::Failed { .. }
    ));
    assert!(enriched.enrichment().reflection_notes.is_none());
    assert!(enriched.enrichment().clarification_questions.is_some());
    assert!(enriched.enrichment().embedding.is_some());
    assert!(enriched.verify_seal());
}

/// A step that overruns its timeout is abandoned and its field stays empty.
#[test]
fn slow_step_times_out() {
    let config = BidwiseConfig::default();
    let mut steps = make_steps(&config);
    steps[1] = Arc::new(SlowStep(Duration::from_millis(500)));
    let orchestrator = make_orchestrator(steps).with_timeout(Duration::from_millis(50));
    let (enriched, report) = orchestrator.enrich(make_recommendation(), &CancellationToken::new());

    assert!(matches!(
        report.outcome(StepId::Clarification).unwrap().status,
        StepStatus::TimedOut { limit_ms: 50 }
    ));
    assert!(enriched.enrichment().clarification_questions.is_none());
    assert!(enriched.enrichment().embedding.is_some());
}

/// An exhausted run budget skips whatever is left.
#[test]
fn exhausted_budget_skips_remaining_steps() {
    let config = BidwiseConfig::default();
    let mut steps = make_steps(&config);
    steps[1] = Arc::new(SlowStep(Duration::from_millis(300)));
    let orchestrator = make_orchestrator(steps)
        .with_timeout(Duration::from_secs(1))
        .with_budget(Duration::from_millis(100));
    let (enriched, report) = orchestrator.enrich(make_recommendation(), &CancellationToken::new());

    assert!(matches!(
        report.outcome(StepId::Embedding).unwrap().status,
        StepStatus::Skipped { .. }
    ));
    assert!(enriched.enrichment().embedding.is_none());
}

#[test]
fn step_cannot_write_outside_its_allowlist() {
    let config = BidwiseConfig::default();
    let mut steps = make_steps(&config);
    steps[0] = Arc::new(TrespassingStep);
    let (enriched, report) = make_orchestrator(steps).enrich(make_recommendation(), &CancellationToken::new());

    assert!(matches!(
        report.outcome(StepId::Reflection).unwrap().status,
        StepStatus::Failed { .. }
    ));
    assert_eq!(
        enriched.enrichment().embedding.as_ref().unwrap().len(),
        config.enrichment.embedding_dimensions
    );
}

/// Re-running over an enriched recommendation changes nothing.
#[test]
fn re_enrichment_is_idempotent() {
    let config = BidwiseConfig::default();
    let orchestrator = make_orchestrator(make_steps(&config));
    let (first, _) = orchestrator.enrich(make_recommendation(), &CancellationToken::new());
    let (second, report) = orchestrator.enrich(first.clone(), &CancellationToken::new());

    assert_eq!(first, second);
    assert_eq!(report.applied_count(), 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.status, StepStatus::Skipped { .. })));
}

#[test]
fn cancelled_run_skips_steps_and_keeps_lifecycle() {
    let config = BidwiseConfig::default();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let rec = make_recommendation();
    let (enriched, report) = make_orchestrator(make_steps(&config)).enrich(rec.clone(), &cancel);

    assert!(report.cancelled);
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(enriched, rec);
    assert_eq!(enriched.lifecycle(), Lifecycle::Finalized);
}

/// Decision fields altered after sealing are refused.
#[test]
fn tampered_decision_is_not_enriched() {
    let config = BidwiseConfig::default();
    let mut value = make_recommendation().to_value().unwrap();
    value["decision"]["confidence_score"] = serde_json::json!(3);
    let tampered = Recommendation::from_value(value).unwrap();
    assert!(!tampered.verify_seal());

    let (enriched, report) = make_orchestrator(make_steps(&config)).enrich(tampered.clone(), &CancellationToken::new());

    assert!(!report.seal_verified);
    assert!(!report.is_clean());
    assert_eq!(enriched, tampered);
    assert!(enriched.enrichment().is_empty());
}
