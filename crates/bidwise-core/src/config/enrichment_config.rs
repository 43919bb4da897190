//! Enrichment orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Soft time limit for a single step.
    pub step_timeout_ms: u64,
    /// Time budget for one orchestrator run across all steps.
    pub budget_ms: u64,
    /// Expected embedding length.
    pub embedding_dimensions: usize,
    /// Mandatory verdicts below this confidence get a clarification question.
    pub low_confidence_mandatory: f64,
    /// Capability data older than this is flagged as stale.
    pub stale_capability_days: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: defaults::DEFAULT_STEP_TIMEOUT_MS,
            budget_ms: defaults::DEFAULT_ENRICHMENT_BUDGET_MS,
            embedding_dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            low_confidence_mandatory: defaults::DEFAULT_LOW_CONFIDENCE_MANDATORY,
            stale_capability_days: defaults::DEFAULT_STALE_CAPABILITY_DAYS,
        }
    }
}

impl EnrichmentConfig {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }
}
