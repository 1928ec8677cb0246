//! Structured logging setup.
//!
//! The library only emits `tracing` events. Test binaries that want to see
//! them call [`init_logging`] once; the filter comes from `PAGEWRIGHT_LOG`
//! (e.g. `PAGEWRIGHT_LOG=pagewright=debug`) and defaults to `info`.
//! Output goes through the test writer, so `cargo test` captures it per test.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directives
pub const LOG_ENV_VAR: &str = "PAGEWRIGHT_LOG";

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a text subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging() -> bool {
    init_logging_with(LogFormat::Text)
}

/// Install a subscriber with the given format
pub fn init_logging_with(format: LogFormat) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter());
    let installed = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_test_writer())
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_test_writer())
            .try_init(),
    };
    installed.is_ok()
}
