//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Initialize the Bidwise tracing/logging system.
///
/// Reads `BIDWISE_LOG` for per-subsystem log levels.
/// Format: `BIDWISE_LOG=bidwise_engine=debug,bidwise_storage=warn`
///
/// Falls back to `bidwise=info` if `BIDWISE_LOG` is not set or is invalid.
///
/// Idempotent: calling it multiple times is safe. If another global
/// subscriber is already installed it is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("bidwise=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
