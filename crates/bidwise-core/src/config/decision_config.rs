//! Decision engine scoring and threshold configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::{ComplianceLevel, RiskSeverity};

/// Base score per overall compliance level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseScores {
    pub compliant: i32,
    pub partial: i32,
    pub warning: i32,
    pub non_compliant: i32,
    pub unknown: i32,
}

impl Default for BaseScores {
    fn default() -> Self {
        Self {
            compliant: defaults::DEFAULT_BASE_COMPLIANT,
            partial: defaults::DEFAULT_BASE_PARTIAL,
            warning: defaults::DEFAULT_BASE_WARNING,
            non_compliant: defaults::DEFAULT_BASE_NON_COMPLIANT,
            unknown: defaults::DEFAULT_BASE_UNKNOWN,
        }
    }
}

impl BaseScores {
    pub fn for_level(&self, level: ComplianceLevel) -> i32 {
        match level {
            ComplianceLevel::Compliant => self.compliant,
            ComplianceLevel::Partial => self.partial,
            ComplianceLevel::Warning => self.warning,
            ComplianceLevel::NonCompliant => self.non_compliant,
            ComplianceLevel::Unknown => self.unknown,
        }
    }
}

/// Penalty charged per verdict at a given level. COMPLIANT and PARTIAL
/// verdicts are never penalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelPenalties {
    pub non_compliant: u32,
    pub warning: u32,
    pub unknown: u32,
}

impl Default for LevelPenalties {
    fn default() -> Self {
        Self {
            non_compliant: defaults::DEFAULT_PENALTY_NON_COMPLIANT,
            warning: defaults::DEFAULT_PENALTY_WARNING,
            unknown: defaults::DEFAULT_PENALTY_UNKNOWN,
        }
    }
}

impl LevelPenalties {
    pub fn for_level(&self, level: ComplianceLevel) -> u32 {
        match level {
            ComplianceLevel::NonCompliant => self.non_compliant,
            ComplianceLevel::Warning => self.warning,
            ComplianceLevel::Unknown => self.unknown,
            ComplianceLevel::Compliant | ComplianceLevel::Partial => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPenalties {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl Default for RiskPenalties {
    fn default() -> Self {
        Self {
            high: defaults::DEFAULT_PENALTY_RISK_HIGH,
            medium: defaults::DEFAULT_PENALTY_RISK_MEDIUM,
            low: defaults::DEFAULT_PENALTY_RISK_LOW,
        }
    }
}

impl RiskPenalties {
    pub fn for_severity(&self, severity: RiskSeverity) -> u32 {
        match severity {
            RiskSeverity::High => self.high,
            RiskSeverity::Medium => self.medium,
            RiskSeverity::Low => self.low,
        }
    }
}

/// Confidence score formula and decision matrix thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub base_scores: BaseScores,
    pub mandatory_bonus: i32,
    pub mandatory_penalty: i32,
    /// Mean confidence at which the confidence term contributes nothing.
    pub confidence_baseline: f64,
    pub confidence_multiplier: f64,
    pub level_penalties: LevelPenalties,
    pub risk_penalties: RiskPenalties,
    /// Upper bound on the summed penalties.
    pub max_penalty_cap: u32,
    pub bid_threshold: u8,
    pub conditional_threshold: u8,
    /// How long the justification writer may take before the template is used.
    pub justification_timeout_ms: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            base_scores: BaseScores::default(),
            mandatory_bonus: defaults::DEFAULT_MANDATORY_BONUS,
            mandatory_penalty: defaults::DEFAULT_MANDATORY_PENALTY,
            confidence_baseline: defaults::DEFAULT_CONFIDENCE_BASELINE,
            confidence_multiplier: defaults::DEFAULT_CONFIDENCE_MULTIPLIER,
            level_penalties: LevelPenalties::default(),
            risk_penalties: RiskPenalties::default(),
            max_penalty_cap: defaults::DEFAULT_MAX_PENALTY_CAP,
            bid_threshold: defaults::DEFAULT_BID_THRESHOLD,
            conditional_threshold: defaults::DEFAULT_CONDITIONAL_THRESHOLD,
            justification_timeout_ms: defaults::DEFAULT_JUSTIFICATION_TIMEOUT_MS,
        }
    }
}

impl DecisionConfig {
    pub fn justification_timeout(&self) -> Duration {
        Duration::from_millis(self.justification_timeout_ms)
    }
}
