//! Learning gatekeeper configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatekeeperConfig {
    pub min_outcomes: usize,
    /// Minimum share of both WON and LOST outcomes.
    pub min_diversity_ratio: f64,
    /// Outcomes older than this are not fresh.
    pub max_data_age_days: i64,
    /// Minimum share of fresh outcomes.
    pub min_fresh_ratio: f64,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            min_outcomes: defaults::DEFAULT_MIN_OUTCOMES,
            min_diversity_ratio: defaults::DEFAULT_MIN_DIVERSITY_RATIO,
            max_data_age_days: defaults::DEFAULT_MAX_DATA_AGE_DAYS,
            min_fresh_ratio: defaults::DEFAULT_MIN_FRESH_RATIO,
        }
    }
}
