//! Code useful for testing.
use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

/// Ensures the test logger is initialized exactly once per test binary.
/// Honors `RUST_LOG`.
pub(crate) fn init_test_logger() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::Builder::from_default_env()
            .format_timestamp_nanos()
            .is_test(true)
            .try_init();
        log::info!("Initialized test logger");
    });
}
