//! Queries for the append-only outcome_history table.

use rusqlite::{params, Connection};

use bidwise_core::errors::StorageError;
use bidwise_core::models::{OutcomeStatus, Recommendation};

use super::recommendations::{format_timestamp, parse_timestamp};
use crate::to_storage_err;

#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeHistoryRow {
    pub id: i64,
    pub recommendation_id: String,
    pub outcome_status: OutcomeStatus,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    pub notes: Option<String>,
}

/// Append the recommendation's current outcome. No-op when none is set.
pub fn append(conn: &Connection, rec: &Recommendation) -> Result<(), StorageError> {
    let e = rec.enrichment();
    let (Some(status), Some(recorded_at)) = (e.outcome_status, e.outcome_recorded_at) else {
        return Ok(());
    };
    conn.execute(
        "INSERT INTO outcome_history (recommendation_id, outcome_status, recorded_at, notes)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            rec.id().to_string(),
            status.as_str(),
            format_timestamp(recorded_at),
            e.outcome_notes,
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Every recording for one recommendation, oldest first.
pub fn query_for(conn: &Connection, recommendation_id: &str) -> Result<Vec<OutcomeHistoryRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, recommendation_id, outcome_status, recorded_at, notes
             FROM outcome_history WHERE recommendation_id = ?1 ORDER BY id",
        )
        .map_err(to_storage_err)?;

    let rows = stmt
        .query_map(params![recommendation_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })
        .map_err(to_storage_err)?;

    let mut result = Vec::new();
    for row in rows {
        let (id, recommendation_id, status, recorded_at, notes) = row.map_err(to_storage_err)?;
        result.push(OutcomeHistoryRow {
            id,
            recommendation_id,
            outcome_status: status.parse().map_err(|e: bidwise_core::errors::OutcomeError| {
                StorageError::Serialization {
                    message: e.to_string(),
                }
            })?,
            recorded_at: parse_timestamp(&recorded_at)?,
            notes,
        });
    }
    Ok(result)
}
