//! The recommendation record and its lifecycle.
//!
//! Decision-owned fields live in a `DecisionRecord` that is sealed at
//! finalization. `Recommendation` hands out only shared references to it, and
//! enrichment fields change only through [`crate::barrier::WriteBarrier`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ComplianceSummary, EnrichmentRecord, RiskItem};
use crate::constants::{MAX_CONFIDENCE_SCORE, MIN_EXECUTIVE_SUMMARY_LEN, MIN_JUSTIFICATION_LEN};
use crate::errors::DecisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationId(Uuid);

impl RecommendationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecommendationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecommendationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Bid,
    NoBid,
    ConditionalBid,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "BID",
            Self::NoBid => "NO_BID",
            Self::ConditionalBid => "CONDITIONAL_BID",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    Finalized,
    Enriched,
    OutcomeRecorded,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finalized => "FINALIZED",
            Self::Enriched => "ENRICHED",
            Self::OutcomeRecorded => "OUTCOME_RECORDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FINALIZED" => Some(Self::Finalized),
            "ENRICHED" => Some(Self::Enriched),
            "OUTCOME_RECORDED" => Some(Self::OutcomeRecorded),
            _ => None,
        }
    }

    /// Staying put is allowed so re-running a stage is harmless.
    pub fn can_advance_to(&self, next: Lifecycle) -> bool {
        next >= *self
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision-owned fields. Immutable once wrapped in a `Recommendation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision: Decision,
    pub confidence_score: u8,
    pub justification: String,
    pub executive_summary: String,
    pub risks: Vec<RiskItem>,
    pub compliance_summary: ComplianceSummary,
    pub requires_human_review: bool,
    pub review_reasons: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DecisionRecord {
    pub fn validate(&self) -> Result<(), DecisionError> {
        if self.confidence_score > MAX_CONFIDENCE_SCORE {
            return Err(DecisionError::ScoreOutOfRange(u16::from(self.confidence_score)));
        }
        let justification_len = self.justification.trim().chars().count();
        if justification_len < MIN_JUSTIFICATION_LEN {
            return Err(DecisionError::JustificationTooShort {
                actual: justification_len,
                minimum: MIN_JUSTIFICATION_LEN,
            });
        }
        let summary_len = self.executive_summary.trim().chars().count();
        if summary_len < MIN_EXECUTIVE_SUMMARY_LEN {
            return Err(DecisionError::ExecutiveSummaryTooShort {
                actual: summary_len,
                minimum: MIN_EXECUTIVE_SUMMARY_LEN,
            });
        }
        self.compliance_summary
            .check_invariants()
            .map_err(DecisionError::InconsistentSummary)
    }
}

/// blake3 digest (hex) of the canonical JSON encoding of a `DecisionRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionSeal(String);

impl DecisionSeal {
    pub fn compute(record: &DecisionRecord) -> Result<Self, DecisionError> {
        let bytes = serde_json::to_vec(record).map_err(|e| DecisionError::Seal(e.to_string()))?;
        Ok(Self(blake3::hash(&bytes).to_hex().to_string()))
    }

    /// Wrap a digest read back from storage. Checked by
    /// [`Recommendation::from_parts`].
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A finalized bid recommendation plus whatever enrichment has been added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    id: RecommendationId,
    lifecycle: Lifecycle,
    decision: DecisionRecord,
    seal: DecisionSeal,
    #[serde(default)]
    enrichment: EnrichmentRecord,
}

impl Recommendation {
    /// Validate and seal the decision fields. The result is `FINALIZED` with
    /// every enrichment field empty.
    pub fn finalize(decision: DecisionRecord) -> Result<Self, DecisionError> {
        Self::finalize_with_id(RecommendationId::new(), decision)
    }

    pub fn finalize_with_id(
        id: RecommendationId,
        decision: DecisionRecord,
    ) -> Result<Self, DecisionError> {
        decision.validate()?;
        let seal = DecisionSeal::compute(&decision)?;
        Ok(Self {
            id,
            lifecycle: Lifecycle::Finalized,
            decision,
            seal,
            enrichment: EnrichmentRecord::default(),
        })
    }

    /// Rebuild a stored recommendation. The seal must still match the
    /// decision fields.
    pub fn from_parts(
        id: RecommendationId,
        lifecycle: Lifecycle,
        decision: DecisionRecord,
        seal: DecisionSeal,
        enrichment: EnrichmentRecord,
    ) -> Result<Self, DecisionError> {
        let rec = Self {
            id,
            lifecycle,
            decision,
            seal,
            enrichment,
        };
        if !rec.verify_seal() {
            return Err(DecisionError::Seal(format!(
                "stored seal of {id} does not match its decision fields"
            )));
        }
        Ok(rec)
    }

    pub fn id(&self) -> RecommendationId {
        self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn decision(&self) -> &DecisionRecord {
        &self.decision
    }

    pub fn enrichment(&self) -> &EnrichmentRecord {
        &self.enrichment
    }

    pub fn seal(&self) -> &DecisionSeal {
        &self.seal
    }

    /// True when the decision fields still hash to the seal taken at
    /// finalization.
    pub fn verify_seal(&self) -> bool {
        DecisionSeal::compute(&self.decision)
            .map(|s| s == self.seal)
            .unwrap_or(false)
    }

    pub(crate) fn enrichment_mut(&mut self) -> &mut EnrichmentRecord {
        &mut self.enrichment
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    /// Plain structured form for transport layers.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
