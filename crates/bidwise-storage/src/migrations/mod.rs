//! Forward-only schema migrations tracked in `PRAGMA user_version`.

pub mod v001_initial;
pub mod v002_outcome_history;

use bidwise_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::writer::with_immediate_transaction;

const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_initial::MIGRATION_SQL),
    (2, v002_outcome_history::MIGRATION_SQL),
];

/// Latest schema version.
pub const LATEST_VERSION: u32 = 2;

pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

/// Apply every migration newer than the database. Each runs in its own
/// transaction together with the version bump.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = current_version(conn)?;
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        with_immediate_transaction(conn, |tx| {
            tx.execute_batch(sql)
                .and_then(|()| tx.pragma_update(None, "user_version", version))
                .map_err(|e| StorageError::MigrationFailed {
                    version,
                    message: e.to_string(),
                })
        })?;
        tracing::info!(version, "migration applied");
    }
    Ok(())
}
