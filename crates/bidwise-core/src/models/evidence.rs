//! Evidence records produced by verification tools.
//!
//! `RawEvidence` is the loosely-typed shape a tool hands back. It becomes an
//! `EvidenceRecord` only after validation, so an `EvidenceRecord` in hand
//! always carries a known level and a confidence inside `[0, 1]`.

use serde::{Deserialize, Serialize};

use super::ComplianceLevel;
use crate::errors::EvidenceError;

/// Opaque key/value payload carried for audit and justification.
/// Decision logic never reads it.
pub type EvidenceDetails = serde_json::Map<String, serde_json::Value>;

/// Unvalidated evidence as emitted by a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvidence {
    pub source: String,
    pub requirement_ref: String,
    #[serde(default)]
    pub raw_status: String,
    /// Level tag, if the tool supplied one. When absent the status map
    /// derives it from `(source, raw_status)`.
    #[serde(default, rename = "compliance_level")]
    pub level: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub details: EvidenceDetails,
    #[serde(default)]
    pub risk_notes: Vec<String>,
    #[serde(default)]
    pub message: String,
}

impl RawEvidence {
    pub fn new(source: impl Into<String>, requirement_ref: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            requirement_ref: requirement_ref.into(),
            ..Self::default()
        }
    }
}

/// One tool's validated finding about one requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvidence", into = "RawEvidence")]
pub struct EvidenceRecord {
    source: String,
    requirement_ref: String,
    raw_status: String,
    level: ComplianceLevel,
    confidence: f64,
    details: EvidenceDetails,
    risk_notes: Vec<String>,
    message: String,
}

impl EvidenceRecord {
    /// Build a record, rejecting an out-of-range or non-finite confidence
    /// and empty identifiers.
    pub fn new(
        source: impl Into<String>,
        requirement_ref: impl Into<String>,
        level: ComplianceLevel,
        confidence: f64,
    ) -> Result<Self, EvidenceError> {
        let source = source.into();
        let requirement_ref = requirement_ref.into();
        if requirement_ref.trim().is_empty() {
            return Err(EvidenceError::EmptyRequirementRef(source));
        }
        if source.trim().is_empty() {
            return Err(EvidenceError::EmptySource(requirement_ref));
        }
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(EvidenceError::ConfidenceOutOfRange {
                requirement_ref,
                value: confidence,
            });
        }
        Ok(Self {
            source,
            requirement_ref,
            raw_status: String::new(),
            level,
            confidence,
            details: EvidenceDetails::new(),
            risk_notes: Vec::new(),
            message: String::new(),
        })
    }

    /// Validate raw evidence whose level has already been resolved.
    pub fn from_raw(raw: RawEvidence, level: ComplianceLevel) -> Result<Self, EvidenceError> {
        Ok(Self::new(raw.source, raw.requirement_ref, level, raw.confidence)?
            .with_raw_status(raw.raw_status)
            .with_details(raw.details)
            .with_risk_notes(raw.risk_notes)
            .with_message(raw.message))
    }

    pub fn with_raw_status(mut self, raw_status: impl Into<String>) -> Self {
        self.raw_status = raw_status.into();
        self
    }

    pub fn with_details(mut self, details: EvidenceDetails) -> Self {
        self.details = details;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn with_risk_notes(mut self, notes: Vec<String>) -> Self {
        self.risk_notes = notes;
        self
    }

    pub fn with_risk_note(mut self, note: impl Into<String>) -> Self {
        self.risk_notes.push(note.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn requirement_ref(&self) -> &str {
        &self.requirement_ref
    }

    pub fn raw_status(&self) -> &str {
        &self.raw_status
    }

    pub fn level(&self) -> ComplianceLevel {
        self.level
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn details(&self) -> &EvidenceDetails {
        &self.details
    }

    pub fn risk_notes(&self) -> &[String] {
        &self.risk_notes
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl TryFrom<RawEvidence> for EvidenceRecord {
    type Error = EvidenceError;

    /// Requires an explicit level tag. Tag-less evidence goes through the
    /// status map instead.
    fn try_from(raw: RawEvidence) -> Result<Self, Self::Error> {
        let level = match raw.level.as_deref() {
            Some(tag) => tag.parse::<ComplianceLevel>()?,
            None => {
                return Err(EvidenceError::Unmapped {
                    source_tool: raw.source,
                    raw_status: raw.raw_status,
                })
            }
        };
        Self::from_raw(raw, level)
    }
}

impl From<EvidenceRecord> for RawEvidence {
    fn from(record: EvidenceRecord) -> Self {
        Self {
            source: record.source,
            requirement_ref: record.requirement_ref,
            raw_status: record.raw_status,
            level: Some(record.level.as_str().to_string()),
            confidence: record.confidence,
            details: record.details,
            risk_notes: record.risk_notes,
            message: record.message,
        }
    }
}
