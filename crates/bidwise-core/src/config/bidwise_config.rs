//! Top-level Bidwise configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::defaults::{MAX_DATA_AGE_DAYS, MAX_UNCERTAINTY_BAND};
use super::{
    CalibrationConfig, DecisionConfig, EnrichmentConfig, GatekeeperConfig, PersistenceConfig,
    ReviewConfig,
};
use crate::constants::{CONFIG_FILE_NAME, MAX_CONFIDENCE_SCORE};
use crate::errors::ConfigError;
use crate::models::ComplianceLevel;

/// Extra `(tool, status) → level` mapping added on top of the built-in table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMapEntry {
    pub tool: String,
    pub status: String,
    pub level: ComplianceLevel,
}

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Caller overrides (applied via `apply_overrides`)
/// 2. Environment variables (`BIDWISE_*`)
/// 3. Project config (`bidwise.toml` in the given root)
/// 4. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BidwiseConfig {
    pub decision: DecisionConfig,
    pub review: ReviewConfig,
    pub enrichment: EnrichmentConfig,
    pub gatekeeper: GatekeeperConfig,
    pub calibration: CalibrationConfig,
    pub persistence: PersistenceConfig,
    pub status_map: Vec<StatusMapEntry>,
}

/// Overrides supplied by the embedding application.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bid_threshold: Option<u8>,
    pub conditional_threshold: Option<u8>,
    pub uncertainty_band: Option<u8>,
    pub step_timeout_ms: Option<u64>,
    pub enrichment_budget_ms: Option<u64>,
    pub min_outcomes: Option<usize>,
}

impl BidwiseConfig {
    /// Load configuration with layered resolution, then validate.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(CONFIG_FILE_NAME);
        if project_config_path.exists() {
            config = Self::from_toml_file(&project_config_path)?;
        }

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `BIDWISE_*` overrides read through `lookup`.
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(config: &mut BidwiseConfig, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("BIDWISE_BID_THRESHOLD").and_then(|v| v.parse().ok()) {
            config.decision.bid_threshold = v;
        }
        if let Some(v) = lookup("BIDWISE_CONDITIONAL_THRESHOLD").and_then(|v| v.parse().ok()) {
            config.decision.conditional_threshold = v;
        }
        if let Some(v) = lookup("BIDWISE_UNCERTAINTY_BAND").and_then(|v| v.parse().ok()) {
            config.review.uncertainty_band = v;
        }
        if let Some(v) = lookup("BIDWISE_STEP_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.enrichment.step_timeout_ms = v;
        }
        if let Some(v) = lookup("BIDWISE_ENRICHMENT_BUDGET_MS").and_then(|v| v.parse().ok()) {
            config.enrichment.budget_ms = v;
        }
        if let Some(v) = lookup("BIDWISE_EMBEDDING_DIMENSIONS").and_then(|v| v.parse().ok()) {
            config.enrichment.embedding_dimensions = v;
        }
        if let Some(v) = lookup("BIDWISE_MIN_OUTCOMES").and_then(|v| v.parse().ok()) {
            config.gatekeeper.min_outcomes = v;
        }
    }

    /// Apply caller overrides (highest priority).
    pub fn apply_overrides(config: &mut BidwiseConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.bid_threshold {
            config.decision.bid_threshold = v;
        }
        if let Some(v) = overrides.conditional_threshold {
            config.decision.conditional_threshold = v;
        }
        if let Some(v) = overrides.uncertainty_band {
            config.review.uncertainty_band = v;
        }
        if let Some(v) = overrides.step_timeout_ms {
            config.enrichment.step_timeout_ms = v;
        }
        if let Some(v) = overrides.enrichment_budget_ms {
            config.enrichment.budget_ms = v;
        }
        if let Some(v) = overrides.min_outcomes {
            config.gatekeeper.min_outcomes = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(config: &BidwiseConfig) -> Result<(), ConfigError> {
        let d = &config.decision;
        if d.bid_threshold > MAX_CONFIDENCE_SCORE {
            return Err(invalid("decision.bid_threshold", "must be between 0 and 100"));
        }
        if d.conditional_threshold > MAX_CONFIDENCE_SCORE {
            return Err(invalid(
                "decision.conditional_threshold",
                "must be between 0 and 100",
            ));
        }
        if d.conditional_threshold > d.bid_threshold {
            return Err(invalid(
                "decision.conditional_threshold",
                "must not exceed decision.bid_threshold",
            ));
        }
        if d.mandatory_bonus < 0 {
            return Err(invalid("decision.mandatory_bonus", "must not be negative"));
        }
        if d.mandatory_penalty < 0 {
            return Err(invalid("decision.mandatory_penalty", "must not be negative"));
        }
        if !d.confidence_baseline.is_finite() || !(0.0..=1.0).contains(&d.confidence_baseline) {
            return Err(invalid(
                "decision.confidence_baseline",
                "must be between 0.0 and 1.0",
            ));
        }
        if !d.confidence_multiplier.is_finite() || d.confidence_multiplier < 0.0 {
            return Err(invalid(
                "decision.confidence_multiplier",
                "must be a non-negative number",
            ));
        }
        if d.justification_timeout_ms == 0 {
            return Err(invalid(
                "decision.justification_timeout_ms",
                "must be greater than 0",
            ));
        }
        if config.review.uncertainty_band > MAX_UNCERTAINTY_BAND {
            return Err(invalid("review.uncertainty_band", "must be at most 25"));
        }
        if config.enrichment.step_timeout_ms == 0 {
            return Err(invalid("enrichment.step_timeout_ms", "must be greater than 0"));
        }
        if config.enrichment.embedding_dimensions == 0 {
            return Err(invalid(
                "enrichment.embedding_dimensions",
                "must be greater than 0",
            ));
        }
        if !(0.0..=1.0).contains(&config.enrichment.low_confidence_mandatory) {
            return Err(invalid(
                "enrichment.low_confidence_mandatory",
                "must be between 0.0 and 1.0",
            ));
        }
        if config.gatekeeper.min_outcomes == 0 {
            return Err(invalid("gatekeeper.min_outcomes", "must be greater than 0"));
        }
        if !(0.0..=0.5).contains(&config.gatekeeper.min_diversity_ratio) {
            return Err(invalid(
                "gatekeeper.min_diversity_ratio",
                "must be between 0.0 and 0.5",
            ));
        }
        if !(1..=MAX_DATA_AGE_DAYS).contains(&config.gatekeeper.max_data_age_days) {
            return Err(invalid(
                "gatekeeper.max_data_age_days",
                "must be between 1 and 36500",
            ));
        }
        if !(0.0..=1.0).contains(&config.gatekeeper.min_fresh_ratio) {
            return Err(invalid(
                "gatekeeper.min_fresh_ratio",
                "must be between 0.0 and 1.0",
            ));
        }
        if config.calibration.ece_bins == 0 {
            return Err(invalid("calibration.ece_bins", "must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
