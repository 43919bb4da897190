//! Ordered resolution rules over conflicting compliance levels.
//!
//! The same list resolves evidence into a requirement verdict and verdicts
//! into the overall compliance level. Rules are evaluated top to bottom and
//! the first match wins.

use bidwise_core::models::ComplianceLevel;

/// One level to resolve, with the mandatory flag of its requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelObservation {
    pub level: ComplianceLevel,
    pub mandatory: bool,
}

impl LevelObservation {
    pub fn new(level: ComplianceLevel, mandatory: bool) -> Self {
        Self { level, mandatory }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionRule {
    MandatoryNonCompliant,
    MandatoryUnknown,
    AnyNonCompliant,
    AllCompliant,
    AnyWarning,
    AnyPartial,
    Fallback,
}

pub const RESOLUTION_ORDER: [ResolutionRule; 7] = [
    ResolutionRule::MandatoryNonCompliant,
    ResolutionRule::MandatoryUnknown,
    ResolutionRule::AnyNonCompliant,
    ResolutionRule::AllCompliant,
    ResolutionRule::AnyWarning,
    ResolutionRule::AnyPartial,
    ResolutionRule::Fallback,
];

impl ResolutionRule {
    pub fn matches(&self, observations: &[LevelObservation]) -> bool {
        let mut iter = observations.iter();
        match self {
            Self::MandatoryNonCompliant => {
                iter.any(|o| o.mandatory && o.level == ComplianceLevel::NonCompliant)
            }
            Self::MandatoryUnknown => {
                iter.any(|o| o.mandatory && o.level == ComplianceLevel::Unknown)
            }
            Self::AnyNonCompliant => iter.any(|o| o.level == ComplianceLevel::NonCompliant),
            // Empty input is not "all compliant": no evidence means UNKNOWN.
            Self::AllCompliant => {
                !observations.is_empty() && iter.all(|o| o.level == ComplianceLevel::Compliant)
            }
            Self::AnyWarning => iter.any(|o| o.level == ComplianceLevel::Warning),
            Self::AnyPartial => iter.any(|o| o.level == ComplianceLevel::Partial),
            Self::Fallback => true,
        }
    }

    pub fn level(&self) -> ComplianceLevel {
        match self {
            Self::MandatoryNonCompliant | Self::AnyNonCompliant => ComplianceLevel::NonCompliant,
            Self::MandatoryUnknown | Self::Fallback => ComplianceLevel::Unknown,
            Self::AllCompliant => ComplianceLevel::Compliant,
            Self::AnyWarning => ComplianceLevel::Warning,
            Self::AnyPartial => ComplianceLevel::Partial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MandatoryNonCompliant => "mandatory_non_compliant",
            Self::MandatoryUnknown => "mandatory_unknown",
            Self::AnyNonCompliant => "any_non_compliant",
            Self::AllCompliant => "all_compliant",
            Self::AnyWarning => "any_warning",
            Self::AnyPartial => "any_partial",
            Self::Fallback => "fallback",
        }
    }
}

/// Resolved level plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub level: ComplianceLevel,
    pub rule: ResolutionRule,
}

pub fn resolve_level(observations: &[LevelObservation]) -> Resolution {
    let rule = RESOLUTION_ORDER
        .iter()
        .copied()
        .find(|r| r.matches(observations))
        .unwrap_or(ResolutionRule::Fallback);
    Resolution {
        level: rule.level(),
        rule,
    }
}
