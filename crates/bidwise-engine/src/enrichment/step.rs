//! Step contract and per-run report.

use std::fmt;

use serde::{Deserialize, Serialize};

use bidwise_core::barrier::{FieldValue, FieldWriter};
use bidwise_core::errors::EnrichmentError;
use bidwise_core::models::Recommendation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Reflection,
    Clarification,
    Embedding,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reflection => "reflection",
            Self::Clarification => "clarification",
            Self::Embedding => "embedding",
        }
    }

    /// The barrier identity this step writes under.
    pub fn writer(&self) -> FieldWriter {
        match self {
            Self::Reflection => FieldWriter::Reflection,
            Self::Clarification => FieldWriter::Clarification,
            Self::Embedding => FieldWriter::Embedding,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One enrichment step. Receives a read-only snapshot and returns the value
/// for its field or a failure. Must be deterministic for a given input so
/// re-running enrichment is safe.
pub trait EnrichmentStep: Send + Sync {
    fn id(&self) -> StepId;

    fn run(&self, recommendation: &Recommendation) -> Result<FieldValue, EnrichmentError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    /// The step produced the value already stored.
    Unchanged,
    Skipped { reason: String },
    Failed { error: String },
    TimedOut { limit_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: StepId,
    #[serde(flatten)]
    pub status: StepStatus,
    pub duration_ms: u64,
}

impl StepOutcome {
    pub fn applied(step: StepId, duration_ms: u64) -> Self {
        Self {
            step,
            status: StepStatus::Applied,
            duration_ms,
        }
    }

    pub fn unchanged(step: StepId, duration_ms: u64) -> Self {
        Self {
            step,
            status: StepStatus::Unchanged,
            duration_ms,
        }
    }

    pub fn skipped(step: StepId, reason: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Skipped {
                reason: reason.into(),
            },
            duration_ms: 0,
        }
    }

    pub fn failed(step: StepId, error: &EnrichmentError, duration_ms: u64) -> Self {
        Self {
            step,
            status: StepStatus::Failed {
                error: error.to_string(),
            },
            duration_ms,
        }
    }

    pub fn timed_out(step: StepId, limit_ms: u64, duration_ms: u64) -> Self {
        Self {
            step,
            status: StepStatus::TimedOut { limit_ms },
            duration_ms,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            StepStatus::Failed { .. } | StepStatus::TimedOut { .. }
        )
    }
}

/// What happened during one orchestrator run, in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentReport {
    pub outcomes: Vec<StepOutcome>,
    pub cancelled: bool,
    /// False when the input's decision fields did not match their seal and
    /// nothing was run.
    pub seal_verified: bool,
}

impl EnrichmentReport {
    pub fn outcome(&self, step: StepId) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.step == step)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == StepStatus::Applied)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.seal_verified && !self.cancelled && self.failures().next().is_none()
    }
}
