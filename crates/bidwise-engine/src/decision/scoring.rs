//! Confidence score.
//!
//! ```text
//! score = BASE[overall]
//!       + (MANDATORY_BONUS if mandatory_met else -MANDATORY_PENALTY)
//!       + (mean_confidence - baseline) * multiplier
//!       - min(level_penalties + risk_penalties, MAX_PENALTY_CAP)
//! clamp(round(score), 0, 100)
//! ```

use serde::{Deserialize, Serialize};

use bidwise_core::config::DecisionConfig;
use bidwise_core::constants::MAX_CONFIDENCE_SCORE;
use bidwise_core::models::{ComplianceSummary, RiskItem};

/// Every term of the score, kept for the decision trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: i32,
    pub mandatory_adjustment: i32,
    pub confidence_term: f64,
    pub level_penalty: u32,
    pub risk_penalty: u32,
    /// Summed penalties after the cap.
    pub penalty_applied: u32,
    /// Unclamped value.
    pub raw: f64,
    pub score: u8,
}

pub fn calculate_confidence_score(
    summary: &ComplianceSummary,
    risks: &[RiskItem],
    config: &DecisionConfig,
) -> ScoreBreakdown {
    let base = config.base_scores.for_level(summary.overall_compliance);
    let mandatory_adjustment = if summary.mandatory_met {
        config.mandatory_bonus
    } else {
        -config.mandatory_penalty
    };
    let confidence_term =
        (summary.confidence_avg - config.confidence_baseline) * config.confidence_multiplier;

    let level_penalty: u32 = summary
        .verdicts
        .iter()
        .map(|v| config.level_penalties.for_level(v.aggregate_level))
        .fold(0u32, u32::saturating_add);
    let risk_penalty: u32 = risks
        .iter()
        .map(|r| config.risk_penalties.for_severity(r.severity))
        .fold(0u32, u32::saturating_add);
    let penalty_applied = level_penalty
        .saturating_add(risk_penalty)
        .min(config.max_penalty_cap);

    let raw = f64::from(base) + f64::from(mandatory_adjustment) + confidence_term
        - f64::from(penalty_applied);
    let score = clamp_score(raw);

    ScoreBreakdown {
        base,
        mandatory_adjustment,
        confidence_term,
        level_penalty,
        risk_penalty,
        penalty_applied,
        raw,
        score,
    }
}

fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, f64::from(MAX_CONFIDENCE_SCORE)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_extremes() {
        assert_eq!(clamp_score(-500.0), 0);
        assert_eq!(clamp_score(250.0), 100);
        assert_eq!(clamp_score(f64::NAN), 0);
        assert_eq!(clamp_score(74.5), 75);
    }

    #[test]
    fn penalties_are_capped() {
        let mut config = DecisionConfig::default();
        config.max_penalty_cap = 5;
        let risks: Vec<RiskItem> = (0..10)
            .map(|i| {
                RiskItem::new(
                    bidwise_core::models::RiskSeverity::High,
                    format!("risk {i}"),
                    "t",
                    bidwise_core::models::RiskCategory::Technical,
                )
            })
            .collect();
        let b = calculate_confidence_score(&ComplianceSummary::empty(), &risks, &config);
        assert_eq!(b.risk_penalty, 40);
        assert_eq!(b.penalty_applied, 5);
    }
}
