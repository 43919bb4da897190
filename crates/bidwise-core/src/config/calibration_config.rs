//! Calibration configuration.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::MODEL_VERSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Number of equal-width confidence bins for ECE.
    pub ece_bins: usize,
    pub model_version: String,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            ece_bins: defaults::DEFAULT_ECE_BINS,
            model_version: MODEL_VERSION.to_string(),
        }
    }
}
