//! Human review trigger configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Scores within this many points of either threshold go to review.
    pub uncertainty_band: u8,
    /// Number of HIGH severity risks that forces review.
    pub high_risk_count: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            uncertainty_band: defaults::DEFAULT_UNCERTAINTY_BAND,
            high_risk_count: defaults::DEFAULT_HIGH_RISK_REVIEW_COUNT,
        }
    }
}
