//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt layer writing to stderr, since stdout
//! carries the CSV output. The filter comes from `RUST_LOG` and defaults to
//! `warn`, which reports rejected commands and lock timeouts.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the global tracing subscriber
///
/// Returns an error if a global subscriber was already installed.
pub fn init_logging() -> Result<(), String> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}
