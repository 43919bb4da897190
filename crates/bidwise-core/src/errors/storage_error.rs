//! Recommendation store errors.

use super::error_code::{self, ErrorCode};
use super::BarrierError;

/// Errors that can occur in a recommendation store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at v{version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Recommendation {id} already exists")]
    AlreadyExists { id: String },

    #[error("Recommendation {id} not found")]
    NotFound { id: String },

    #[error("Decision fields of {id} differ from the stored row")]
    DecisionMismatch { id: String },

    #[error("Field {field} of {id} is already written with a different value")]
    FieldConflict { id: String, field: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl StorageError {
    /// A store refusing to persist an enrichment write for `id`.
    pub fn field_conflict(id: impl Into<String>, error: BarrierError) -> Self {
        let field = match error {
            BarrierError::AlreadyWritten { field } => field,
            other => other.to_string(),
        };
        Self::FieldConflict {
            id: id.into(),
            field,
        }
    }
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        error_code::STORAGE_ERROR
    }
}
