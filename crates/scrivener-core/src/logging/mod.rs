//! Structured logging with `tracing`.
//!
//! - [`init_subscriber`] installs the process-wide stderr subscriber
//! - [`capture_logs`] installs a thread-local capture layer for tests
//!
//! `RUST_LOG` always takes precedence over the configured level.

pub mod test_utils;

use serde::{Deserialize, Serialize};

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

/// Output format for the stderr subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup; later calls are no-ops.
///
/// # Arguments
///
/// * `level` - Default filter directive (e.g. `"info"`, `"scrivener_llm=debug"`).
/// * `format` - Compact text or JSON lines.
pub fn init_subscriber(level: &str, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails only if a global subscriber already exists
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
