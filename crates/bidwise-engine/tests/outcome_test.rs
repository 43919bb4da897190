//! Outcome recording, calibration, and learning gatekeeper tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use bidwise_core::config::{BidwiseConfig, CalibrationConfig, GatekeeperConfig};
use bidwise_core::errors::OutcomeError;
use bidwise_core::models::{
    ComplianceLevel, EvidenceRecord, Lifecycle, OutcomeObservation, OutcomeStatus,
    RecommendationId,
};
use bidwise_core::traits::{FixedClock, RecommendationStore};
use bidwise_engine::outcome::{CalibrationCalculator, GatekeeperStatus};
use bidwise_engine::{ComplianceAggregator, DecisionEngine, LearningGatekeeper, MemoryStore, OutcomeRecorder};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap()
}

fn make_observation(score: u8, status: OutcomeStatus, age_days: i64) -> OutcomeObservation {
    OutcomeObservation {
        recommendation_id: RecommendationId::new(),
        confidence_score: score,
        status,
        recorded_at: now() - Duration::days(age_days),
    }
}

/// `n` fresh outcomes, every fourth one LOST.
fn make_population(n: usize) -> Vec<OutcomeObservation> {
    (0..n)
        .map(|i| {
            let status = if i % 4 == 0 { OutcomeStatus::Lost } else { OutcomeStatus::Won };
            make_observation(60 + (i % 40) as u8, status, 10)
        })
        .collect()
}

fn make_store_with(level: ComplianceLevel) -> (Arc<MemoryStore>, RecommendationId) {
    let store = Arc::new(MemoryStore::new());
    let verdict = ComplianceAggregator::aggregate(
        "REQ-1",
        true,
        vec![EvidenceRecord::new("certification_checker", "REQ-1", level, 0.9).unwrap()],
    );
    let rec = DecisionEngine::new(&BidwiseConfig::default())
        .decide(&[verdict])
        .unwrap()
        .recommendation;
    store.insert_finalized(&rec).unwrap();
    (store, rec.id())
}

#[test]
fn gatekeeper_blocks_cold_start() {
    let gatekeeper = LearningGatekeeper::new(GatekeeperConfig::default());
    let decision = gatekeeper.evaluate(&make_population(5), now());
    assert!(!decision.allowed);
    assert_eq!(decision.status, GatekeeperStatus::InsufficientData);
    assert_eq!(decision.reasons.len(), 1);
}

#[test]
fn gatekeeper_requires_both_outcomes() {
    let gatekeeper = LearningGatekeeper::new(GatekeeperConfig::default());
    let all_won: Vec<_> = (0..40).map(|_| make_observation(80, OutcomeStatus::Won, 5)).collect();
    let decision = gatekeeper.evaluate(&all_won, now());
    assert!(!decision.allowed);
    assert_eq!(decision.status, GatekeeperStatus::LowDiversity);
    assert_eq!(decision.lost, 0);
}

/// Outcomes stamped after `now` are not fresh.
#[test]
fn gatekeeper_ignores_future_outcomes() {
    let gatekeeper = LearningGatekeeper::new(GatekeeperConfig::default());
    let mut future = make_population(40);
    for o in &mut future {
        o.recorded_at = now() + Duration::days(3);
    }
    let decision = gatekeeper.evaluate(&future, now());
    assert_eq!(decision.fresh, 0);
    assert_eq!(decision.status, GatekeeperStatus::StaleData);
}

/// An unrepresentable window never panics and counts every past outcome.
#[test]
fn gatekeeper_survives_extreme_windows() {
    let population = make_population(40);
    for days in [i64::MAX / 2, i64::MAX, -30] {
        let gatekeeper = LearningGatekeeper::new(GatekeeperConfig {
            max_data_age_days: days,
            ..GatekeeperConfig::default()
        });
        let decision = gatekeeper.evaluate(&population, now());
        let expected = if days > 0 { 40 } else { 0 };
        assert_eq!(decision.fresh, expected, "window of {days} days");
    }
}

#[test]
fn gatekeeper_rejects_stale_history() {
    let gatekeeper = LearningGatekeeper::new(GatekeeperConfig::default());
    let mut old = make_population(40);
    for o in &mut old {
        o.recorded_at = now() - Duration::days(400);
    }
    let decision = gatekeeper.evaluate(&old, now());
    assert_eq!(decision.status, GatekeeperStatus::StaleData);
    assert_eq!(decision.fresh, 0);
}

#[test]
fn gatekeeper_enables_with_enough_mixed_fresh_data() {
    let gatekeeper = LearningGatekeeper::new(GatekeeperConfig::default());
    let decision = gatekeeper.evaluate(&make_population(30), now());
    assert!(decision.allowed);
    assert_eq!(decision.status, GatekeeperStatus::Enabled);
    assert!(decision.reasons.is_empty());
}

/// Every failing check is reported; the status names the first one.
#[test]
fn gatekeeper_lists_every_failing_check() {
    let gatekeeper = LearningGatekeeper::new(GatekeeperConfig::default());
    let decision = gatekeeper.evaluate(&[], now());
    assert_eq!(decision.status, GatekeeperStatus::InsufficientData);
    assert_eq!(decision.reasons.len(), 3);
}

#[test]
fn perfectly_calibrated_population_has_zero_ece() {
    let calc = CalibrationCalculator::new(&CalibrationConfig::default());
    let population = vec![
        make_observation(100, OutcomeStatus::Won, 1),
        make_observation(100, OutcomeStatus::Won, 1),
        make_observation(0, OutcomeStatus::Lost, 1),
    ];
    let report = calc.report(&population, now());
    assert_eq!(report.ece, 0.0);
    assert_eq!(report.mean_brier, 0.0);
    assert_eq!(report.population_size, 3);
}

#[test]
fn overconfidence_ratio_compares_against_win_rate() {
    let calc = CalibrationCalculator::new(&CalibrationConfig::default());
    let population = vec![
        make_observation(90, OutcomeStatus::Lost, 1),
        make_observation(90, OutcomeStatus::Won, 1),
        make_observation(20, OutcomeStatus::Lost, 1),
        make_observation(50, OutcomeStatus::Lost, 1),
    ];
    let report = calc.report(&population, now());
    assert_eq!(report.win_rate, 0.25);
    assert_eq!(report.overconfidence_ratio, 0.75);
    assert_eq!(report.underconfidence_ratio, 0.25);
}

#[test]
fn recorder_rejects_unknown_id() {
    let recorder = OutcomeRecorder::new(Arc::new(MemoryStore::new()), &CalibrationConfig::default());
    let err = recorder
        .record(&RecommendationId::new(), OutcomeStatus::Won, None)
        .unwrap_err();
    assert!(matches!(err, OutcomeError::UnknownRecommendation(_)));
}

#[test]
fn recorder_writes_outcome_and_calibration() {
    let (store, id) = make_store_with(ComplianceLevel::Compliant);
    let recorder = OutcomeRecorder::new(store.clone(), &CalibrationConfig::default())
        .with_clock(Arc::new(FixedClock(now())));

    let rec = recorder.record(&id, OutcomeStatus::Won, Some("awarded".into())).unwrap();

    assert_eq!(rec.lifecycle(), Lifecycle::OutcomeRecorded);
    assert_eq!(rec.enrichment().outcome_recorded_at, Some(now()));
    assert_eq!(rec.enrichment().outcome_notes.as_deref(), Some("awarded"));
    let metrics = rec.enrichment().calibration_metrics.as_ref().unwrap();
    assert_eq!(metrics.computed_at, now());
    assert_eq!(metrics.model_version, CalibrationConfig::default().model_version);

    let stored = store.get(&id).unwrap().unwrap();
    assert_eq!(stored, rec);
}

/// Per-recommendation contributions add up to the population ECE.
#[test]
fn stored_contributions_sum_to_population_ece() {
    let store = Arc::new(MemoryStore::new());
    let engine = DecisionEngine::new(&BidwiseConfig::default());
    let levels = [
        ComplianceLevel::Compliant,
        ComplianceLevel::Partial,
        ComplianceLevel::Warning,
        ComplianceLevel::NonCompliant,
    ];
    let ids: Vec<RecommendationId> = levels
        .iter()
        .map(|level| {
            let verdict = ComplianceAggregator::aggregate(
                "REQ-1",
                false,
                vec![EvidenceRecord::new("tech_validator", "REQ-1", *level, 0.8).unwrap()],
            );
            let rec = engine.decide(&[verdict]).unwrap().recommendation;
            store.insert_finalized(&rec).unwrap();
            rec.id()
        })
        .collect();

    let recorder = OutcomeRecorder::new(store.clone(), &CalibrationConfig::default());
    for (i, id) in ids.iter().enumerate() {
        let status = if i % 2 == 0 { OutcomeStatus::Won } else { OutcomeStatus::Lost };
        recorder.record(id, status, None).unwrap();
    }
    // Earlier recordings saw a smaller population; re-record so every row is current.
    for (i, id) in ids.iter().enumerate() {
        let status = if i % 2 == 0 { OutcomeStatus::Won } else { OutcomeStatus::Lost };
        recorder.record(id, status, None).unwrap();
    }

    let report = recorder.report().unwrap();
    assert_eq!(report.population_size, 4);
    let sum: f64 = ids
        .iter()
        .map(|id| {
            store.get(id).unwrap().unwrap().enrichment().calibration_metrics.as_ref().unwrap().ece_contribution
        })
        .sum();
    assert!((sum - report.ece).abs() < 1e-9);
}
