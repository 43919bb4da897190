//! The closed set of compliance levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EvidenceError;

/// Normalized compliance level for one piece of evidence or one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceLevel {
    Compliant,
    Partial,
    Warning,
    NonCompliant,
    Unknown,
}

impl ComplianceLevel {
    pub const ALL: [ComplianceLevel; 5] = [
        Self::Compliant,
        Self::Partial,
        Self::Warning,
        Self::NonCompliant,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::Partial => "PARTIAL",
            Self::Warning => "WARNING",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a level tag. Case-insensitive; `-` and spaces are accepted
    /// in place of `_`.
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "COMPLIANT" => Some(Self::Compliant),
            "PARTIAL" => Some(Self::Partial),
            "WARNING" => Some(Self::Warning),
            "NON_COMPLIANT" => Some(Self::NonCompliant),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Compliant or partially compliant.
    pub fn is_passing(&self) -> bool {
        matches!(self, Self::Compliant | Self::Partial)
    }
}

impl fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceLevel {
    type Err = EvidenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| EvidenceError::UnknownLevel(s.to_string()))
    }
}
