//! Queries for the recommendations table.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use bidwise_core::errors::StorageError;
use bidwise_core::models::{
    DecisionRecord, DecisionSeal, EnrichmentRecord, Lifecycle, OutcomeObservation, OutcomeStatus,
    Recommendation, RecommendationId,
};

use crate::to_storage_err;

const SELECT_COLUMNS: &str = "id, lifecycle, decision_json, seal, reflection_json, \
     clarification_json, embedding, embedding_dims, calibration_json, outcome_status, \
     outcome_recorded_at, outcome_notes";

/// Raw column values of one row, before decoding.
#[derive(Debug, Clone)]
pub struct RecommendationRow {
    pub id: String,
    pub lifecycle: String,
    pub decision_json: String,
    pub seal: String,
    pub reflection_json: Option<String>,
    pub clarification_json: Option<String>,
    pub embedding: Option<Vec<u8>>,
    pub embedding_dims: Option<i64>,
    pub calibration_json: Option<String>,
    pub outcome_status: Option<String>,
    pub outcome_recorded_at: Option<String>,
    pub outcome_notes: Option<String>,
}

impl RecommendationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            lifecycle: row.get(1)?,
            decision_json: row.get(2)?,
            seal: row.get(3)?,
            reflection_json: row.get(4)?,
            clarification_json: row.get(5)?,
            embedding: row.get(6)?,
            embedding_dims: row.get(7)?,
            calibration_json: row.get(8)?,
            outcome_status: row.get(9)?,
            outcome_recorded_at: row.get(10)?,
            outcome_notes: row.get(11)?,
        })
    }

    /// Decode into a recommendation, re-checking the seal.
    pub fn into_recommendation(self) -> Result<Recommendation, StorageError> {
        let id = RecommendationId::parse(&self.id).map_err(serialization_err)?;
        let lifecycle = Lifecycle::parse(&self.lifecycle).ok_or_else(|| StorageError::Serialization {
            message: format!("unknown lifecycle {:?}", self.lifecycle),
        })?;
        let decision: DecisionRecord =
            serde_json::from_str(&self.decision_json).map_err(serialization_err)?;

        let embedding = match (self.embedding, self.embedding_dims) {
            (Some(bytes), Some(dims)) => Some(bytes_to_f32_vec(&bytes, dims as usize)?),
            _ => None,
        };
        let enrichment = EnrichmentRecord {
            reflection_notes: decode_json(self.reflection_json.as_deref())?,
            clarification_questions: decode_json(self.clarification_json.as_deref())?,
            embedding,
            calibration_metrics: decode_json(self.calibration_json.as_deref())?,
            outcome_status: self
                .outcome_status
                .as_deref()
                .map(str::parse::<OutcomeStatus>)
                .transpose()
                .map_err(serialization_err)?,
            outcome_recorded_at: self
                .outcome_recorded_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            outcome_notes: self.outcome_notes,
        };

        Recommendation::from_parts(id, lifecycle, decision, DecisionSeal::from_hex(self.seal), enrichment)
            .map_err(serialization_err)
    }
}

/// Insert a finalized recommendation. Fails with `AlreadyExists` if the id
/// is taken.
pub fn insert_finalized(conn: &Connection, rec: &Recommendation) -> Result<(), StorageError> {
    let id = rec.id().to_string();
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM recommendations WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )
        .map_err(to_storage_err)?;
    if exists {
        return Err(StorageError::AlreadyExists { id });
    }

    let decision = rec.decision();
    let decision_json = serde_json::to_string(decision).map_err(serialization_err)?;
    let e = rec.enrichment();
    conn.execute(
        "INSERT INTO recommendations (
            id, decision, confidence_score, requires_human_review, decision_json, seal,
            lifecycle, reflection_json, clarification_json, embedding, embedding_dims,
            calibration_json, outcome_status, outcome_recorded_at, outcome_notes, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            id,
            decision.decision.as_str(),
            i64::from(decision.confidence_score),
            decision.requires_human_review,
            decision_json,
            rec.seal().as_str(),
            rec.lifecycle().as_str(),
            encode_json(e.reflection_notes.as_ref())?,
            encode_json(e.clarification_questions.as_ref())?,
            e.embedding.as_deref().map(f32_vec_to_bytes),
            e.embedding.as_ref().map(|v| v.len() as i64),
            encode_json(e.calibration_metrics.as_ref())?,
            e.outcome_status.map(|s| s.as_str()),
            e.outcome_recorded_at.map(format_timestamp),
            e.outcome_notes,
            format_timestamp(decision.created_at),
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Seal and lifecycle of an existing row. Errors with `NotFound` if absent.
pub fn seal_and_lifecycle(conn: &Connection, id: &str) -> Result<(String, Lifecycle), StorageError> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT seal, lifecycle FROM recommendations WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(to_storage_err)?;
    let (seal, lifecycle) = row.ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;
    let lifecycle = Lifecycle::parse(&lifecycle).ok_or_else(|| StorageError::Serialization {
        message: format!("unknown lifecycle {lifecycle:?}"),
    })?;
    Ok((seal, lifecycle))
}

/// Write reflection, clarification, embedding, and lifecycle. `enrichment`
/// is the merged record; the caller enforces write-once.
pub fn update_enrichment(
    conn: &Connection,
    id: &str,
    enrichment: &EnrichmentRecord,
    lifecycle: Lifecycle,
) -> Result<(), StorageError> {
    let e = enrichment;
    conn.execute(
        "UPDATE recommendations SET
            reflection_json = ?1, clarification_json = ?2, embedding = ?3,
            embedding_dims = ?4, lifecycle = ?5
         WHERE id = ?6",
        params![
            encode_json(e.reflection_notes.as_ref())?,
            encode_json(e.clarification_questions.as_ref())?,
            e.embedding.as_deref().map(f32_vec_to_bytes),
            e.embedding.as_ref().map(|v| v.len() as i64),
            lifecycle.as_str(),
            id,
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Write outcome, calibration, and lifecycle.
pub fn update_outcome(
    conn: &Connection,
    rec: &Recommendation,
    lifecycle: Lifecycle,
) -> Result<(), StorageError> {
    let e = rec.enrichment();
    conn.execute(
        "UPDATE recommendations SET
            outcome_status = ?1, outcome_recorded_at = ?2, outcome_notes = ?3,
            calibration_json = ?4, lifecycle = ?5
         WHERE id = ?6",
        params![
            e.outcome_status.map(|s| s.as_str()),
            e.outcome_recorded_at.map(format_timestamp),
            e.outcome_notes,
            encode_json(e.calibration_metrics.as_ref())?,
            lifecycle.as_str(),
            rec.id().to_string(),
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Recommendation>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM recommendations WHERE id = ?1"
        ))
        .map_err(to_storage_err)?;
    let row = stmt
        .query_row(params![id], RecommendationRow::from_row)
        .optional()
        .map_err(to_storage_err)?;
    row.map(RecommendationRow::into_recommendation).transpose()
}

/// One observation per row with a recorded outcome.
pub fn outcomes(conn: &Connection) -> Result<Vec<OutcomeObservation>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, confidence_score, outcome_status, outcome_recorded_at
             FROM recommendations
             WHERE outcome_status IS NOT NULL AND outcome_recorded_at IS NOT NULL
             ORDER BY id",
        )
        .map_err(to_storage_err)?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(to_storage_err)?;

    let mut result = Vec::new();
    for row in rows {
        let (id, score, status, recorded_at) = row.map_err(to_storage_err)?;
        result.push(OutcomeObservation {
            recommendation_id: RecommendationId::parse(&id).map_err(serialization_err)?,
            confidence_score: u8::try_from(score).map_err(serialization_err)?,
            status: status.parse().map_err(serialization_err)?,
            recorded_at: parse_timestamp(&recorded_at)?,
        });
    }
    Ok(result)
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM recommendations", [], |row| row.get(0))
        .map_err(to_storage_err)
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(serialization_err)
}

fn serialization_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Serialization {
        message: e.to_string(),
    }
}

fn encode_json<T: serde::Serialize>(value: Option<&T>) -> Result<Option<String>, StorageError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(serialization_err)
}

fn decode_json<T: serde::de::DeserializeOwned>(json: Option<&str>) -> Result<Option<T>, StorageError> {
    json.map(serde_json::from_str).transpose().map_err(serialization_err)
}

/// Little-endian f32 encoding.
fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_f32_vec(bytes: &[u8], expected_dims: usize) -> Result<Vec<f32>, StorageError> {
    if bytes.len() != expected_dims * 4 {
        return Err(StorageError::Serialization {
            message: format!(
                "embedding blob is {} bytes, expected {} dimensions",
                bytes.len(),
                expected_dims
            ),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_bytes_round_trip() {
        let v = vec![0.25f32, -1.0, 3.5e-8, 0.0];
        assert_eq!(bytes_to_f32_vec(&f32_vec_to_bytes(&v), 4).unwrap(), v);
        assert!(bytes_to_f32_vec(&[0u8; 6], 2).is_err());
    }

    #[test]
    fn timestamps_keep_nanoseconds() {
        let ts = DateTime::from_timestamp(1_760_000_000, 123_456_789).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
    }
}
