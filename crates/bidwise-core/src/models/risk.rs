//! Risk items surfaced on a recommendation.

use serde::{Deserialize, Serialize};

/// Risk severity. Ordered HIGH first so a plain sort puts the worst on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskSeverity {
    High,
    Medium,
    Low,
}

impl RiskSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Compliance,
    Technical,
    Budget,
    Timeline,
    Strategic,
    Resource,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliance => "compliance",
            Self::Technical => "technical",
            Self::Budget => "budget",
            Self::Timeline => "timeline",
            Self::Strategic => "strategic",
            Self::Resource => "resource",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskItem {
    pub severity: RiskSeverity,
    pub description: String,
    /// Producing tool.
    pub source: String,
    pub category: RiskCategory,
}

impl RiskItem {
    pub fn new(
        severity: RiskSeverity,
        description: impl Into<String>,
        source: impl Into<String>,
        category: RiskCategory,
    ) -> Self {
        Self {
            severity,
            description: description.into(),
            source: source.into(),
            category,
        }
    }
}
