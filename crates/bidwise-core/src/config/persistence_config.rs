//! Persistence retry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Backoff before retry `n` is `retry_base_ms * 2^n`.
    pub retry_base_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::DEFAULT_PERSIST_MAX_RETRIES,
            retry_base_ms: defaults::DEFAULT_PERSIST_RETRY_BASE_MS,
        }
    }
}

impl PersistenceConfig {
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_base_ms.saturating_mul(1u64 << attempt.min(16)))
    }
}
