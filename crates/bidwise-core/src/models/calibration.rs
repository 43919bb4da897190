//! Calibration metrics attached to a recommendation once its outcome is known.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observational calibration figures. They never feed back into scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationMetrics {
    /// `(confidence_score/100 - outcome)^2` for this recommendation.
    pub brier_score: f64,
    /// This recommendation's share of the population ECE. Summing the
    /// contributions over the population yields `population_ece`.
    pub ece_contribution: f64,
    pub population_ece: f64,
    /// Fraction of the population whose stated probability exceeded the
    /// observed win rate.
    pub overconfidence_ratio: f64,
    /// Fraction of the population whose stated probability fell below the
    /// observed win rate.
    pub underconfidence_ratio: f64,
    pub population_size: usize,
    pub model_version: String,
    pub computed_at: DateTime<Utc>,
}
