//! V002: append-only log of every outcome recording.
//! The recommendations row keeps only the latest outcome.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS outcome_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recommendation_id TEXT NOT NULL REFERENCES recommendations(id),
    outcome_status TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    notes TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_outcome_history_recommendation
    ON outcome_history(recommendation_id);
"#;
