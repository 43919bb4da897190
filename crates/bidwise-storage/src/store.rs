//! `RecommendationStore` over SQLite.

use std::path::Path;

use bidwise_core::barrier::WriteBarrier;
use bidwise_core::errors::StorageError;
use bidwise_core::models::{Lifecycle, OutcomeObservation, Recommendation, RecommendationId};
use bidwise_core::traits::RecommendationStore;
use rusqlite::Connection;

use crate::connection::writer::with_immediate_transaction;
use crate::connection::DatabaseManager;
use crate::queries::outcome_history::{self, OutcomeHistoryRow};
use crate::queries::recommendations;

pub struct SqliteStore {
    db: DatabaseManager,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
        })
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    pub fn count(&self) -> Result<i64, StorageError> {
        self.db.with_conn(recommendations::count)
    }

    /// Every outcome ever recorded for `id`, oldest first.
    pub fn outcome_history(&self, id: &RecommendationId) -> Result<Vec<OutcomeHistoryRow>, StorageError> {
        self.db
            .with_conn(|conn| outcome_history::query_for(conn, &id.to_string()))
    }

    /// Check the row exists with the same seal and return the lifecycle to
    /// store: never lower than what is already there.
    fn checked_lifecycle(conn: &Connection, rec: &Recommendation) -> Result<Lifecycle, StorageError> {
        let id = rec.id().to_string();
        let (seal, stored) = recommendations::seal_and_lifecycle(conn, &id)?;
        if seal != rec.seal().as_str() {
            return Err(StorageError::DecisionMismatch { id });
        }
        Ok(stored.max(rec.lifecycle()))
    }
}

impl RecommendationStore for SqliteStore {
    fn insert_finalized(&self, recommendation: &Recommendation) -> Result<(), StorageError> {
        self.db.with_conn(|conn| {
            with_immediate_transaction(conn, |tx| recommendations::insert_finalized(tx, recommendation))
        })?;
        tracing::debug!(recommendation_id = %recommendation.id(), "recommendation stored");
        Ok(())
    }

    fn update_enrichment(&self, recommendation: &Recommendation) -> Result<(), StorageError> {
        self.db.with_conn(|conn| {
            with_immediate_transaction(conn, |tx| {
                let id = recommendation.id().to_string();
                let stored = recommendations::get(tx, &id)?
                    .ok_or_else(|| StorageError::NotFound { id: id.clone() })?;
                if stored.seal() != recommendation.seal() {
                    return Err(StorageError::DecisionMismatch { id });
                }
                let mut merged = stored.enrichment().clone();
                WriteBarrier::merge_enrichment(&mut merged, recommendation.enrichment())
                    .map_err(|e| StorageError::field_conflict(id.as_str(), e))?;
                let lifecycle = stored.lifecycle().max(recommendation.lifecycle());
                recommendations::update_enrichment(tx, &id, &merged, lifecycle)
            })
        })
    }

    fn update_outcome(&self, recommendation: &Recommendation) -> Result<(), StorageError> {
        self.db.with_conn(|conn| {
            with_immediate_transaction(conn, |tx| {
                let lifecycle = Self::checked_lifecycle(tx, recommendation)?;
                recommendations::update_outcome(tx, recommendation, lifecycle)?;
                outcome_history::append(tx, recommendation)
            })
        })
    }

    fn get(&self, id: &RecommendationId) -> Result<Option<Recommendation>, StorageError> {
        self.db
            .with_conn(|conn| recommendations::get(conn, &id.to_string()))
    }

    fn outcomes(&self) -> Result<Vec<OutcomeObservation>, StorageError> {
        self.db.with_conn(recommendations::outcomes)
    }
}
