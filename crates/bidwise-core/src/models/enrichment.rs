//! Enrichment-owned values. Each is written by exactly one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CalibrationMetrics, OutcomeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReflectionFlag {
    /// High score despite HIGH severity risks.
    OverconfidenceRisk,
    /// Large share of UNKNOWN verdicts.
    HighUncertainty,
    /// NO_BID although nearly everything is compliant and nothing is risky.
    ConservativeDecision,
    /// BID although a large share is non-compliant.
    AggressiveDecision,
}

impl ReflectionFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OverconfidenceRisk => "OVERCONFIDENCE_RISK",
            Self::HighUncertainty => "HIGH_UNCERTAINTY",
            Self::ConservativeDecision => "CONSERVATIVE_DECISION",
            Self::AggressiveDecision => "AGGRESSIVE_DECISION",
        }
    }
}

/// Structured explanation of which verdicts drove a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionNotes {
    pub summary: String,
    pub drivers: Vec<String>,
    pub flags: Vec<ReflectionFlag>,
    pub observations: Vec<String>,
    /// 1.0 when no flag fired, lower for each one that did.
    pub consistency_score: f64,
    pub reasoner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    /// Normalized trigger key, unique within one recommendation.
    pub trigger: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_ref: Option<String>,
}

/// Nullable, additive-only fields of a recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub reflection_notes: Option<ReflectionNotes>,
    pub clarification_questions: Option<Vec<ClarificationQuestion>>,
    pub embedding: Option<Vec<f32>>,
    pub calibration_metrics: Option<CalibrationMetrics>,
    pub outcome_status: Option<OutcomeStatus>,
    pub outcome_recorded_at: Option<DateTime<Utc>>,
    pub outcome_notes: Option<String>,
}

impl EnrichmentRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
