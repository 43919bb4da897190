/// Bidwise system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version tag stamped on calibration metrics. Bump when decision logic changes.
pub const MODEL_VERSION: &str = "1.0.0";

/// Project-level config file name.
pub const CONFIG_FILE_NAME: &str = "bidwise.toml";

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "BIDWISE_LOG";

/// Upper bound of the confidence score.
pub const MAX_CONFIDENCE_SCORE: u8 = 100;

/// Minimum justification length (characters, after trimming).
pub const MIN_JUSTIFICATION_LEN: usize = 50;

/// Minimum executive summary length (characters, after trimming).
pub const MIN_EXECUTIVE_SUMMARY_LEN: usize = 20;
