//! Parallel evidence collection tests.

use std::sync::Arc;

use bidwise_core::models::{ComplianceLevel, RawEvidence};
use bidwise_core::traits::{Cancellable, CancellationToken, RequirementSpec, VerificationTool};
use bidwise_engine::evidence::status_map::{BUDGET_ANALYZER, CERTIFICATION_CHECKER, TIMELINE_ASSESSOR};
use bidwise_engine::{EvidenceCollector, StatusMap};

struct FixedTool {
    name: &'static str,
    status: &'static str,
    confidence: f64,
}

impl VerificationTool for FixedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn verify(&self, requirement: &RequirementSpec) -> RawEvidence {
        let mut raw = RawEvidence::new(self.name, "echoed-wrong-ref");
        raw.raw_status = self.status.to_string();
        raw.confidence = self.confidence;
        raw.message = format!("checked {}", requirement.requirement_ref);
        raw
    }
}

struct PanickingTool;

impl VerificationTool for PanickingTool {
    fn name(&self) -> &str {
        TIMELINE_ASSESSOR
    }

    fn verify(&self, _: &RequirementSpec) -> RawEvidence {
        panic!("timeline service crashed");
    }
}

fn make_requirement(r: &str, mandatory: bool, tools: &[&str]) -> RequirementSpec {
    RequirementSpec {
        requirement_ref: r.to_string(),
        text: format!("Requirement {r}"),
        is_mandatory: mandatory,
        tools: tools.iter().map(|t| t.to_string()).collect(),
    }
}

fn make_collector() -> EvidenceCollector {
    EvidenceCollector::new(StatusMap::builtin())
        .with_tool(Arc::new(FixedTool {
            name: CERTIFICATION_CHECKER,
            status: "VALID",
            confidence: 0.95,
        }))
        .with_tool(Arc::new(FixedTool {
            name: BUDGET_ANALYZER,
            status: "HIGH_END",
            confidence: 0.7,
        }))
}

#[test]
fn verdicts_follow_requirement_order() {
    let requirements: Vec<_> = (0..20)
        .map(|i| make_requirement(&format!("REQ-{i}"), i == 0, &[CERTIFICATION_CHECKER]))
        .collect();
    let result = make_collector()
        .collect(&requirements, &CancellationToken::new())
        .unwrap();

    assert!(result.is_clean());
    let refs: Vec<_> = result.data.iter().map(|v| v.requirement_ref.clone()).collect();
    let expected: Vec<_> = (0..20).map(|i| format!("REQ-{i}")).collect();
    assert_eq!(refs, expected);
    assert!(result.data.iter().all(|v| v.aggregate_level == ComplianceLevel::Compliant));
}

/// Evidence is attributed to the requirement it was collected for.
#[test]
fn evidence_is_bound_to_its_requirement() {
    let result = make_collector()
        .collect(
            &[make_requirement("REQ-7", false, &[CERTIFICATION_CHECKER, BUDGET_ANALYZER])],
            &CancellationToken::new(),
        )
        .unwrap();

    let verdict = &result.data[0];
    assert_eq!(verdict.contributing_evidence.len(), 2);
    assert!(verdict
        .contributing_evidence
        .iter()
        .all(|e| e.requirement_ref() == "REQ-7"));
    assert_eq!(verdict.aggregate_level, ComplianceLevel::Warning);
}

#[test]
fn missing_and_panicking_tools_yield_unknown() {
    let collector = make_collector().with_tool(Arc::new(PanickingTool));
    let result = collector
        .collect(
            &[
                make_requirement("REQ-1", false, &[TIMELINE_ASSESSOR]),
                make_requirement("REQ-2", false, &["strategy_evaluator"]),
            ],
            &CancellationToken::new(),
        )
        .unwrap();

    for verdict in &result.data {
        assert_eq!(verdict.aggregate_level, ComplianceLevel::Unknown);
        assert_eq!(verdict.aggregate_confidence, 0.0);
        assert_eq!(verdict.contributing_evidence[0].raw_status(), "TOOL_UNAVAILABLE");
    }
}

#[test]
fn out_of_range_confidence_is_reported_not_fatal() {
    let collector = EvidenceCollector::new(StatusMap::builtin()).with_tool(Arc::new(FixedTool {
        name: CERTIFICATION_CHECKER,
        status: "VALID",
        confidence: 1.4,
    }));
    let result = collector
        .collect(&[make_requirement("REQ-1", true, &[CERTIFICATION_CHECKER])], &CancellationToken::new())
        .unwrap();

    assert_eq!(result.error_count(), 1);
    assert_eq!(result.data[0].aggregate_level, ComplianceLevel::Unknown);
    assert!(result.data[0].contributing_evidence.is_empty());
}

#[test]
fn cancelled_collection_returns_cancelled() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = make_collector()
        .collect(&[make_requirement("REQ-1", true, &[CERTIFICATION_CHECKER])], &cancel)
        .unwrap_err();
    assert!(matches!(err, bidwise_core::errors::PipelineError::Cancelled));
}
