//! Tracing initialization is idempotent.

#[test]
fn init_tracing_twice_is_safe() {
    bidwise_core::tracing::init_tracing();
    bidwise_core::tracing::init_tracing();
    tracing::info!(component = "test", "tracing initialized");
}
