//! Cold-start guard for any future adaptive behavior.
//!
//! A pure predicate over recorded outcomes. It is deliberately not wired
//! into the decision engine; callers that learn from outcomes must check it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use bidwise_core::config::GatekeeperConfig;
use bidwise_core::models::{OutcomeObservation, OutcomeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatekeeperStatus {
    Enabled,
    InsufficientData,
    LowDiversity,
    StaleData,
}

impl GatekeeperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::InsufficientData => "INSUFFICIENT_DATA",
            Self::LowDiversity => "LOW_DIVERSITY",
            Self::StaleData => "STALE_DATA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatekeeperDecision {
    pub allowed: bool,
    /// First failing check, or `Enabled`.
    pub status: GatekeeperStatus,
    /// One line per failing check.
    pub reasons: Vec<String>,
    pub population_size: usize,
    pub won: usize,
    pub lost: usize,
    pub fresh: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LearningGatekeeper {
    config: GatekeeperConfig,
}

impl LearningGatekeeper {
    pub fn new(config: GatekeeperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    pub fn evaluate(&self, outcomes: &[OutcomeObservation], now: DateTime<Utc>) -> GatekeeperDecision {
        let total = outcomes.len();
        let won = outcomes.iter().filter(|o| o.status == OutcomeStatus::Won).count();
        let lost = total - won;
        // A window too wide to represent reaches back to the earliest date.
        let cutoff = Duration::try_days(self.config.max_data_age_days.max(0))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let fresh = outcomes
            .iter()
            .filter(|o| (cutoff..=now).contains(&o.recorded_at))
            .count();

        let mut failures: Vec<(GatekeeperStatus, String)> = Vec::new();

        if total < self.config.min_outcomes {
            failures.push((
                GatekeeperStatus::InsufficientData,
                format!("{total} outcomes recorded, {} required", self.config.min_outcomes),
            ));
        }

        let ratio = |n: usize| if total == 0 { 0.0 } else { n as f64 / total as f64 };
        if won == 0 || lost == 0 || ratio(won.min(lost)) < self.config.min_diversity_ratio {
            failures.push((
                GatekeeperStatus::LowDiversity,
                format!(
                    "outcome mix {won} WON / {lost} LOST is below the {:.0}% minimum share",
                    self.config.min_diversity_ratio * 100.0
                ),
            ));
        }

        if ratio(fresh) < self.config.min_fresh_ratio {
            failures.push((
                GatekeeperStatus::StaleData,
                format!(
                    "{fresh} of {total} outcomes are within {} days",
                    self.config.max_data_age_days
                ),
            ));
        }

        let status = failures
            .first()
            .map(|(s, _)| *s)
            .unwrap_or(GatekeeperStatus::Enabled);
        let allowed = failures.is_empty();

        tracing::debug!(
            status = status.as_str(),
            total,
            won,
            lost,
            fresh,
            "learning gatekeeper evaluated"
        );

        GatekeeperDecision {
            allowed,
            status,
            reasons: failures.into_iter().map(|(_, r)| r).collect(),
            population_size: total,
            won,
            lost,
            fresh,
        }
    }
}
