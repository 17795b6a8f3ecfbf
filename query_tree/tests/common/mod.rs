//! Shared test setup.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TEST_SETUP: Once = Once::new();

/// Install a stderr subscriber once per test binary. `RUST_LOG` overrides
/// the default `debug` filter.
pub fn init_test_logging() {
    TEST_SETUP.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init()
            .unwrap_or_else(|e| eprintln!("Error: Failed to set up logging: {}", e));
    });
}
