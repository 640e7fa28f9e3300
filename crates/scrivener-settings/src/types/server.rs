//! HTTP listener and logging settings.

use scrivener_core::logging::LogFormat;
use serde::{Deserialize, Serialize};

/// Server network and runtime settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` auto-assigns).
    pub port: u16,
    /// Maximum accepted request body in bytes (media uploads included).
    pub max_upload_bytes: usize,
    /// Send permissive CORS headers on every route.
    pub cors_allow_all: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 100 * 1024 * 1024,
            cors_allow_all: true,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}
