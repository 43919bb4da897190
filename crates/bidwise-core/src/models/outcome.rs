//! Real-world bid outcomes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecommendationId;
use crate::errors::OutcomeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Won,
    Lost,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Won => "WON",
            Self::Lost => "LOST",
        }
    }

    /// 1.0 for WON, 0.0 for LOST.
    pub fn as_binary(&self) -> f64 {
        match self {
            Self::Won => 1.0,
            Self::Lost => 0.0,
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeStatus {
    type Err = OutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WON" => Ok(Self::Won),
            "LOST" => Ok(Self::Lost),
            _ => Err(OutcomeError::UnknownStatus(s.to_string())),
        }
    }
}

/// One recorded outcome, as seen by calibration and the gatekeeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeObservation {
    pub recommendation_id: RecommendationId,
    pub confidence_score: u8,
    pub status: OutcomeStatus,
    pub recorded_at: DateTime<Utc>,
}

impl OutcomeObservation {
    /// Stated win probability implied by the confidence score.
    pub fn predicted(&self) -> f64 {
        f64::from(self.confidence_score) / 100.0
    }
}
