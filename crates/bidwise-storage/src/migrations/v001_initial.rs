//! V001: recommendations table.

pub const MIGRATION_SQL: &str = r#"
-- Decision columns are written once at insert. Enrichment and outcome
-- columns are filled in by later stages.
CREATE TABLE IF NOT EXISTS recommendations (
    id TEXT PRIMARY KEY,
    decision TEXT NOT NULL,
    confidence_score INTEGER NOT NULL CHECK (confidence_score BETWEEN 0 AND 100),
    requires_human_review INTEGER NOT NULL,
    decision_json TEXT NOT NULL,
    seal TEXT NOT NULL,
    lifecycle TEXT NOT NULL,
    reflection_json TEXT,
    clarification_json TEXT,
    embedding BLOB,
    embedding_dims INTEGER,
    calibration_json TEXT,
    outcome_status TEXT,
    outcome_recorded_at TEXT,
    outcome_notes TEXT,
    created_at TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_recommendations_created
    ON recommendations(created_at);
CREATE INDEX IF NOT EXISTS idx_recommendations_outcome
    ON recommendations(outcome_status) WHERE outcome_status IS NOT NULL;
"#;
