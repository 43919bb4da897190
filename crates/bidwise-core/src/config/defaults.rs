//! Compiled configuration defaults.

// Base score per overall compliance level.
pub const DEFAULT_BASE_COMPLIANT: i32 = 85;
pub const DEFAULT_BASE_PARTIAL: i32 = 60;
pub const DEFAULT_BASE_WARNING: i32 = 55;
pub const DEFAULT_BASE_NON_COMPLIANT: i32 = 20;
pub const DEFAULT_BASE_UNKNOWN: i32 = 45;

pub const DEFAULT_MANDATORY_BONUS: i32 = 10;
pub const DEFAULT_MANDATORY_PENALTY: i32 = 15;
pub const DEFAULT_CONFIDENCE_BASELINE: f64 = 0.7;
pub const DEFAULT_CONFIDENCE_MULTIPLIER: f64 = 20.0;

// Per-verdict penalties.
pub const DEFAULT_PENALTY_NON_COMPLIANT: u32 = 5;
pub const DEFAULT_PENALTY_WARNING: u32 = 2;
pub const DEFAULT_PENALTY_UNKNOWN: u32 = 3;

// Per-risk penalties.
pub const DEFAULT_PENALTY_RISK_HIGH: u32 = 4;
pub const DEFAULT_PENALTY_RISK_MEDIUM: u32 = 2;
pub const DEFAULT_PENALTY_RISK_LOW: u32 = 0;

pub const DEFAULT_MAX_PENALTY_CAP: u32 = 40;
pub const DEFAULT_BID_THRESHOLD: u8 = 75;
pub const DEFAULT_CONDITIONAL_THRESHOLD: u8 = 50;
pub const DEFAULT_JUSTIFICATION_TIMEOUT_MS: u64 = 5_000;

// Human review.
pub const DEFAULT_UNCERTAINTY_BAND: u8 = 3;
pub const DEFAULT_HIGH_RISK_REVIEW_COUNT: usize = 1;
pub const MAX_UNCERTAINTY_BAND: u8 = 25;

// Enrichment.
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 50;
pub const DEFAULT_ENRICHMENT_BUDGET_MS: u64 = 100;
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;
pub const DEFAULT_LOW_CONFIDENCE_MANDATORY: f64 = 0.5;
pub const DEFAULT_STALE_CAPABILITY_DAYS: u64 = 365;

// Learning gatekeeper.
pub const DEFAULT_MIN_OUTCOMES: usize = 30;
pub const DEFAULT_MIN_DIVERSITY_RATIO: f64 = 0.1;
pub const DEFAULT_MAX_DATA_AGE_DAYS: i64 = 180;
pub const MAX_DATA_AGE_DAYS: i64 = 36_500;
pub const DEFAULT_MIN_FRESH_RATIO: f64 = 0.5;

// Calibration.
pub const DEFAULT_ECE_BINS: usize = 10;

// Persistence.
pub const DEFAULT_PERSIST_MAX_RETRIES: u32 = 2;
pub const DEFAULT_PERSIST_RETRY_BASE_MS: u64 = 10;
