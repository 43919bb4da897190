//! Field-allowlist write barrier for enrichment.
//!
//! Every post-finalization write goes through a `WriteBarrier` issued to one
//! `FieldWriter`. The barrier rejects writes outside the writer's allowlist,
//! keeps write-once fields write-once, and only moves the lifecycle forward.
//! Decision-owned fields have no write path at all.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::errors::BarrierError;
use crate::models::{
    CalibrationMetrics, ClarificationQuestion, EnrichmentRecord, Lifecycle, OutcomeStatus,
    Recommendation, ReflectionNotes,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrichmentField {
    ReflectionNotes,
    ClarificationQuestions,
    Embedding,
    CalibrationMetrics,
    OutcomeStatus,
    OutcomeRecordedAt,
    OutcomeNotes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// A second identical write is a no-op; a differing one is rejected.
    WriteOnce,
    LastWriteWins,
}

impl EnrichmentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReflectionNotes => "reflection_notes",
            Self::ClarificationQuestions => "clarification_questions",
            Self::Embedding => "embedding",
            Self::CalibrationMetrics => "calibration_metrics",
            Self::OutcomeStatus => "outcome_status",
            Self::OutcomeRecordedAt => "outcome_recorded_at",
            Self::OutcomeNotes => "outcome_notes",
        }
    }

    pub fn policy(&self) -> WritePolicy {
        match self {
            Self::ReflectionNotes | Self::ClarificationQuestions | Self::Embedding => {
                WritePolicy::WriteOnce
            }
            Self::CalibrationMetrics
            | Self::OutcomeStatus
            | Self::OutcomeRecordedAt
            | Self::OutcomeNotes => WritePolicy::LastWriteWins,
        }
    }

    /// Whether `rec` already holds a value for this field.
    pub fn is_populated(&self, rec: &Recommendation) -> bool {
        let e = rec.enrichment();
        match self {
            Self::ReflectionNotes => e.reflection_notes.is_some(),
            Self::ClarificationQuestions => e.clarification_questions.is_some(),
            Self::Embedding => e.embedding.is_some(),
            Self::CalibrationMetrics => e.calibration_metrics.is_some(),
            Self::OutcomeStatus => e.outcome_status.is_some(),
            Self::OutcomeRecordedAt => e.outcome_recorded_at.is_some(),
            Self::OutcomeNotes => e.outcome_notes.is_some(),
        }
    }
}

impl fmt::Display for EnrichmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single legitimate writer for each group of enrichment fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldWriter {
    Reflection,
    Clarification,
    Embedding,
    Calibration,
    OutcomeRecorder,
}

impl FieldWriter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reflection => "reflection",
            Self::Clarification => "clarification",
            Self::Embedding => "embedding",
            Self::Calibration => "calibration",
            Self::OutcomeRecorder => "outcome_recorder",
        }
    }

    pub fn allowlist(&self) -> &'static [EnrichmentField] {
        match self {
            Self::Reflection => &[EnrichmentField::ReflectionNotes],
            Self::Clarification => &[EnrichmentField::ClarificationQuestions],
            Self::Embedding => &[EnrichmentField::Embedding],
            Self::Calibration => &[EnrichmentField::CalibrationMetrics],
            Self::OutcomeRecorder => &[
                EnrichmentField::OutcomeStatus,
                EnrichmentField::OutcomeRecordedAt,
                EnrichmentField::OutcomeNotes,
            ],
        }
    }
}

impl fmt::Display for FieldWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value destined for one or more enrichment fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    ReflectionNotes(ReflectionNotes),
    ClarificationQuestions(Vec<ClarificationQuestion>),
    Embedding(Vec<f32>),
    CalibrationMetrics(CalibrationMetrics),
    Outcome {
        status: OutcomeStatus,
        recorded_at: DateTime<Utc>,
        notes: Option<String>,
    },
}

impl FieldValue {
    /// Fields this value writes.
    pub fn fields(&self) -> &'static [EnrichmentField] {
        match self {
            Self::ReflectionNotes(_) => &[EnrichmentField::ReflectionNotes],
            Self::ClarificationQuestions(_) => &[EnrichmentField::ClarificationQuestions],
            Self::Embedding(_) => &[EnrichmentField::Embedding],
            Self::CalibrationMetrics(_) => &[EnrichmentField::CalibrationMetrics],
            Self::Outcome { .. } => &[
                EnrichmentField::OutcomeStatus,
                EnrichmentField::OutcomeRecordedAt,
                EnrichmentField::OutcomeNotes,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteEffect {
    Written,
    /// Identical value already present.
    Unchanged,
}

/// Write capability for one `FieldWriter`.
#[derive(Debug, Clone, Copy)]
pub struct WriteBarrier {
    writer: FieldWriter,
}

impl WriteBarrier {
    pub fn for_writer(writer: FieldWriter) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> FieldWriter {
        self.writer
    }

    /// Apply `value` to `rec` if every target field is on this writer's
    /// allowlist and its write policy permits it.
    pub fn write(
        &self,
        rec: &mut Recommendation,
        value: FieldValue,
    ) -> Result<WriteEffect, BarrierError> {
        let allowed = self.writer.allowlist();
        if let Some(field) = value.fields().iter().find(|f| !allowed.contains(*f)) {
            tracing::warn!(
                writer = self.writer.as_str(),
                field = field.as_str(),
                recommendation_id = %rec.id(),
                "write barrier rejected field outside allowlist"
            );
            return Err(BarrierError::FieldNotAllowed {
                writer: self.writer.to_string(),
                field: field.to_string(),
            });
        }

        let effect = match value {
            FieldValue::ReflectionNotes(notes) => write_once(
                &mut rec.enrichment_mut().reflection_notes,
                notes,
                EnrichmentField::ReflectionNotes,
            )?,
            FieldValue::ClarificationQuestions(questions) => write_once(
                &mut rec.enrichment_mut().clarification_questions,
                questions,
                EnrichmentField::ClarificationQuestions,
            )?,
            FieldValue::Embedding(vector) => write_once(
                &mut rec.enrichment_mut().embedding,
                vector,
                EnrichmentField::Embedding,
            )?,
            FieldValue::CalibrationMetrics(metrics) => {
                if rec.enrichment().outcome_status.is_none() {
                    return Err(BarrierError::MissingPrerequisite {
                        field: EnrichmentField::CalibrationMetrics.to_string(),
                        prerequisite: EnrichmentField::OutcomeStatus.to_string(),
                    });
                }
                overwrite(&mut rec.enrichment_mut().calibration_metrics, metrics)
            }
            FieldValue::Outcome {
                status,
                recorded_at,
                notes,
            } => {
                let e = rec.enrichment_mut();
                let effects = [
                    overwrite(&mut e.outcome_status, status),
                    overwrite(&mut e.outcome_recorded_at, recorded_at),
                    overwrite_nullable(&mut e.outcome_notes, notes),
                ];
                Self::advance(rec, Lifecycle::OutcomeRecorded)?;
                if effects.contains(&WriteEffect::Written) {
                    WriteEffect::Written
                } else {
                    WriteEffect::Unchanged
                }
            }
        };

        tracing::debug!(
            writer = self.writer.as_str(),
            recommendation_id = %rec.id(),
            ?effect,
            "enrichment write applied"
        );
        Ok(effect)
    }

    /// Merge the write-once fields of `incoming` into `stored`, the way a
    /// store persists an enrichment run. Absent incoming values never clear
    /// a stored one; a differing value for a populated field is rejected
    /// and `stored` is left as it was.
    pub fn merge_enrichment(
        stored: &mut EnrichmentRecord,
        incoming: &EnrichmentRecord,
    ) -> Result<WriteEffect, BarrierError> {
        let mut merged = stored.clone();
        let mut effects = Vec::with_capacity(3);
        if let Some(notes) = &incoming.reflection_notes {
            effects.push(write_once(
                &mut merged.reflection_notes,
                notes.clone(),
                EnrichmentField::ReflectionNotes,
            )?);
        }
        if let Some(questions) = &incoming.clarification_questions {
            effects.push(write_once(
                &mut merged.clarification_questions,
                questions.clone(),
                EnrichmentField::ClarificationQuestions,
            )?);
        }
        if let Some(vector) = &incoming.embedding {
            effects.push(write_once(
                &mut merged.embedding,
                vector.clone(),
                EnrichmentField::Embedding,
            )?);
        }
        *stored = merged;
        if effects.contains(&WriteEffect::Written) {
            Ok(WriteEffect::Written)
        } else {
            Ok(WriteEffect::Unchanged)
        }
    }

    /// Move `rec` forward in its lifecycle. Standing still is allowed.
    pub fn advance(rec: &mut Recommendation, to: Lifecycle) -> Result<(), BarrierError> {
        let from = rec.lifecycle();
        if !from.can_advance_to(to) {
            return Err(BarrierError::IllegalTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        rec.set_lifecycle(to);
        Ok(())
    }
}

fn write_once<T: PartialEq>(
    slot: &mut Option<T>,
    value: T,
    field: EnrichmentField,
) -> Result<WriteEffect, BarrierError> {
    if let Some(existing) = slot.as_ref() {
        if *existing == value {
            return Ok(WriteEffect::Unchanged);
        }
        return Err(BarrierError::AlreadyWritten {
            field: field.to_string(),
        });
    }
    *slot = Some(value);
    Ok(WriteEffect::Written)
}

fn overwrite<T: PartialEq>(slot: &mut Option<T>, value: T) -> WriteEffect {
    overwrite_nullable(slot, Some(value))
}

fn overwrite_nullable<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> WriteEffect {
    if *slot == value {
        return WriteEffect::Unchanged;
    }
    *slot = value;
    WriteEffect::Written
}
