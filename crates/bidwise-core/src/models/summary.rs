//! Compliance summary over all verdicts of one bid.

use serde::{Deserialize, Serialize};

use super::{ComplianceLevel, RequirementVerdict};

/// Verdict counts per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub compliant: usize,
    pub partial: usize,
    pub warning: usize,
    pub non_compliant: usize,
    pub unknown: usize,
}

impl LevelCounts {
    pub fn get(&self, level: ComplianceLevel) -> usize {
        match level {
            ComplianceLevel::Compliant => self.compliant,
            ComplianceLevel::Partial => self.partial,
            ComplianceLevel::Warning => self.warning,
            ComplianceLevel::NonCompliant => self.non_compliant,
            ComplianceLevel::Unknown => self.unknown,
        }
    }

    pub fn increment(&mut self, level: ComplianceLevel) {
        match level {
            ComplianceLevel::Compliant => self.compliant += 1,
            ComplianceLevel::Partial => self.partial += 1,
            ComplianceLevel::Warning => self.warning += 1,
            ComplianceLevel::NonCompliant => self.non_compliant += 1,
            ComplianceLevel::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.compliant + self.partial + self.warning + self.non_compliant + self.unknown
    }
}

/// Decision-engine view of every verdict in a bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub overall_compliance: ComplianceLevel,
    pub counts: LevelCounts,
    pub total_evaluated: usize,
    /// False iff some mandatory verdict is NON_COMPLIANT.
    pub mandatory_met: bool,
    /// True iff some mandatory verdict is UNKNOWN.
    pub mandatory_unknown: bool,
    /// Mean aggregate confidence over all verdicts, `0.0` when empty.
    pub confidence_avg: f64,
    pub verdicts: Vec<RequirementVerdict>,
}

impl ComplianceSummary {
    /// Summary for a bid with nothing evaluated.
    pub fn empty() -> Self {
        Self {
            overall_compliance: ComplianceLevel::Unknown,
            counts: LevelCounts::default(),
            total_evaluated: 0,
            mandatory_met: true,
            mandatory_unknown: false,
            confidence_avg: 0.0,
            verdicts: Vec::new(),
        }
    }

    /// Share of verdicts at `level`, `0.0` when empty.
    pub fn ratio(&self, level: ComplianceLevel) -> f64 {
        if self.total_evaluated == 0 {
            return 0.0;
        }
        self.counts.get(level) as f64 / self.total_evaluated as f64
    }

    /// Check the count and mandatory invariants against the verdict list.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.counts.total() != self.total_evaluated {
            return Err(format!(
                "counts sum to {} but total_evaluated is {}",
                self.counts.total(),
                self.total_evaluated
            ));
        }
        if self.verdicts.len() != self.total_evaluated {
            return Err(format!(
                "{} verdicts but total_evaluated is {}",
                self.verdicts.len(),
                self.total_evaluated
            ));
        }
        let mandatory_failed = self
            .verdicts
            .iter()
            .any(|v| v.is_mandatory && v.aggregate_level == ComplianceLevel::NonCompliant);
        if self.mandatory_met == mandatory_failed {
            return Err(format!(
                "mandatory_met is {} but mandatory NON_COMPLIANT present is {}",
                self.mandatory_met, mandatory_failed
            ));
        }
        Ok(())
    }
}

impl Default for ComplianceSummary {
    fn default() -> Self {
        Self::empty()
    }
}
