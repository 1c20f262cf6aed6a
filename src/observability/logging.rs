//! Structured logging.
//!
//! Uses the tracing crate; the filter comes from `RUST_LOG` when set,
//! otherwise from the configured default level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging subsystem. Safe to call more than once; later
/// calls are no-ops (relevant for tests).
pub fn init_logging(default_level: &str) {
    let directive = format!("bookie_gateway={default_level}");
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&directive)),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
