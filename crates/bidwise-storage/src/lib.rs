//! # bidwise-storage
//!
//! SQLite-backed `RecommendationStore`. One serialized writer connection,
//! `BEGIN IMMEDIATE` writes, `STRICT` tables, forward-only migrations.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
pub use store::SqliteStore;

use bidwise_core::errors::StorageError;

pub(crate) fn to_storage_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
