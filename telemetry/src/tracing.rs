use std::sync::Once;

use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Default level directive applied when `RUST_LOG` is unset.
const DEFAULT_LEVEL: &str = "info";

// Tests within one binary share the global subscriber, so installation must
// happen at most once per process.
static TEST_TRACING: Once = Once::new();

/// Initializes the global tracing subscriber for a binary.
///
/// Respects `RUST_LOG` when set; otherwise enables the default level for the
/// named service and the pipeline crates it drives.
pub fn init_tracing(service_name: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{service_name}={DEFAULT_LEVEL},migrate={DEFAULT_LEVEL},dynamo={DEFAULT_LEVEL}"
            ))
        }))
        .with(fmt::layer())
        .init();

    debug!(service_name, "tracing initialized");
}

/// Initializes tracing for tests.
///
/// Subsequent calls are no-ops, so every test can call this unconditionally.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
            )
            .with(fmt::layer().with_test_writer())
            .init();
    });
}
