//! Per-tool `raw_status → ComplianceLevel` table.
//!
//! Tools report loosely-typed status strings. This table is the only place
//! they are interpreted. It is static data extended by config, never
//! inferred at runtime.

use std::collections::HashMap;

use bidwise_core::config::BidwiseConfig;
use bidwise_core::errors::EvidenceError;
use bidwise_core::models::{ComplianceLevel, EvidenceRecord, RawEvidence};

pub const CERTIFICATION_CHECKER: &str = "certification_checker";
pub const TECH_VALIDATOR: &str = "tech_validator";
pub const BUDGET_ANALYZER: &str = "budget_analyzer";
pub const TIMELINE_ASSESSOR: &str = "timeline_assessor";
pub const STRATEGY_EVALUATOR: &str = "strategy_evaluator";
pub const KNOWLEDGE_QUERY: &str = "knowledge_query";

/// Matches any status of a tool.
const ANY_STATUS: &str = "*";

const BUILTIN: &[(&str, &str, ComplianceLevel)] = &[
    (CERTIFICATION_CHECKER, "VALID", ComplianceLevel::Compliant),
    (CERTIFICATION_CHECKER, "EXPIRING_SOON", ComplianceLevel::Warning),
    (CERTIFICATION_CHECKER, "EXPIRED", ComplianceLevel::NonCompliant),
    (CERTIFICATION_CHECKER, "PENDING", ComplianceLevel::Partial),
    (CERTIFICATION_CHECKER, "NOT_FOUND", ComplianceLevel::Unknown),
    (TECH_VALIDATOR, "AVAILABLE", ComplianceLevel::Partial),
    (TECH_VALIDATOR, "NOT_IN_DATABASE", ComplianceLevel::Unknown),
    (TECH_VALIDATOR, "STALE", ComplianceLevel::Warning),
    (BUDGET_ANALYZER, "ACCEPTABLE", ComplianceLevel::Compliant),
    (BUDGET_ANALYZER, "LOW_END", ComplianceLevel::Compliant),
    (BUDGET_ANALYZER, "HIGH_END", ComplianceLevel::Warning),
    (BUDGET_ANALYZER, "BELOW_MINIMUM", ComplianceLevel::Warning),
    (BUDGET_ANALYZER, "EXCEEDS_MAXIMUM", ComplianceLevel::NonCompliant),
    (TIMELINE_ASSESSOR, "FEASIBLE", ComplianceLevel::Compliant),
    (TIMELINE_ASSESSOR, "CONSERVATIVE", ComplianceLevel::Compliant),
    (TIMELINE_ASSESSOR, "TIGHT", ComplianceLevel::Warning),
    (TIMELINE_ASSESSOR, "AGGRESSIVE", ComplianceLevel::Warning),
    (TIMELINE_ASSESSOR, "UNREALISTIC", ComplianceLevel::NonCompliant),
    (TIMELINE_ASSESSOR, "NO_HISTORICAL_DATA", ComplianceLevel::Unknown),
    (STRATEGY_EVALUATOR, "STRONG_ALIGNMENT", ComplianceLevel::Compliant),
    (STRATEGY_EVALUATOR, "MODERATE_ALIGNMENT", ComplianceLevel::Partial),
    (STRATEGY_EVALUATOR, "WEAK_ALIGNMENT", ComplianceLevel::Warning),
    (STRATEGY_EVALUATOR, "MISALIGNMENT", ComplianceLevel::NonCompliant),
    (KNOWLEDGE_QUERY, ANY_STATUS, ComplianceLevel::Unknown),
];

/// Lookup table keyed by `(tool, STATUS)`.
#[derive(Debug, Clone)]
pub struct StatusMap {
    entries: HashMap<(String, String), ComplianceLevel>,
}

impl StatusMap {
    /// The table for the six standard tools.
    pub fn builtin() -> Self {
        let mut map = Self {
            entries: HashMap::with_capacity(BUILTIN.len()),
        };
        for (tool, status, level) in BUILTIN {
            map.insert(tool, status, *level);
        }
        map
    }

    /// Built-in table plus `status_map` entries from config. Config entries
    /// win on conflict.
    pub fn from_config(config: &BidwiseConfig) -> Self {
        let mut map = Self::builtin();
        for entry in &config.status_map {
            map.insert(&entry.tool, &entry.status, entry.level);
        }
        map
    }

    pub fn insert(&mut self, tool: &str, status: &str, level: ComplianceLevel) {
        self.entries.insert(key(tool, status), level);
    }

    /// Exact `(tool, status)` match first, then the tool's wildcard.
    pub fn lookup(&self, tool: &str, status: &str) -> Option<ComplianceLevel> {
        self.entries
            .get(&key(tool, status))
            .or_else(|| self.entries.get(&key(tool, ANY_STATUS)))
            .copied()
    }

    /// Like `lookup`, but an unmapped pair is UNKNOWN.
    pub fn level_for(&self, tool: &str, status: &str) -> ComplianceLevel {
        match self.lookup(tool, status) {
            Some(level) => level,
            None => {
                tracing::warn!(tool, status, "unmapped tool status, treating as UNKNOWN");
                ComplianceLevel::Unknown
            }
        }
    }

    /// Validate raw evidence. An explicit level tag wins; otherwise the
    /// table supplies the level.
    pub fn normalize(&self, raw: RawEvidence) -> Result<EvidenceRecord, EvidenceError> {
        let level = match raw.level.as_deref() {
            Some(tag) => tag.parse::<ComplianceLevel>()?,
            None => self.level_for(&raw.source, &raw.raw_status),
        };
        EvidenceRecord::from_raw(raw, level)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StatusMap {
    fn default() -> Self {
        Self::builtin()
    }
}

fn key(tool: &str, status: &str) -> (String, String) {
    (
        tool.trim().to_ascii_lowercase(),
        status.trim().to_ascii_uppercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_on_status() {
        let map = StatusMap::builtin();
        assert_eq!(
            map.lookup(CERTIFICATION_CHECKER, "expired"),
            Some(ComplianceLevel::NonCompliant)
        );
        assert_eq!(
            map.lookup(BUDGET_ANALYZER, " High_End "),
            Some(ComplianceLevel::Warning)
        );
    }

    #[test]
    fn knowledge_query_is_always_unknown() {
        let map = StatusMap::builtin();
        assert_eq!(
            map.lookup(KNOWLEDGE_QUERY, "MATCHES_FOUND"),
            Some(ComplianceLevel::Unknown)
        );
    }

    #[test]
    fn unmapped_pair_is_unknown() {
        let map = StatusMap::builtin();
        assert_eq!(map.lookup("security_scanner", "CLEAN"), None);
        assert_eq!(
            map.level_for("security_scanner", "CLEAN"),
            ComplianceLevel::Unknown
        );
    }

    #[test]
    fn explicit_tag_overrides_table() {
        let map = StatusMap::builtin();
        let mut raw = RawEvidence::new(CERTIFICATION_CHECKER, "REQ-1");
        raw.raw_status = "VALID".into();
        raw.level = Some("WARNING".into());
        raw.confidence = 0.6;
        assert_eq!(map.normalize(raw).unwrap().level(), ComplianceLevel::Warning);
    }

    #[test]
    fn normalize_rejects_bad_confidence() {
        let map = StatusMap::builtin();
        let mut raw = RawEvidence::new(TIMELINE_ASSESSOR, "REQ-2");
        raw.raw_status = "FEASIBLE".into();
        raw.confidence = 1.5;
        assert!(matches!(
            map.normalize(raw),
            Err(EvidenceError::ConfidenceOutOfRange { .. })
        ));
    }
}
