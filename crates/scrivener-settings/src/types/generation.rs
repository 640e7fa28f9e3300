//! Generative-text provider settings.

use scrivener_core::RetryConfig;
use serde::{Deserialize, Serialize};

/// Per-operation input length caps, in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TruncationCaps {
    /// Cap for structure / expressions enhancement.
    pub enhance: usize,
    /// Cap for translation.
    pub translate: usize,
    /// Cap for summarization.
    pub summarize: usize,
}

impl Default for TruncationCaps {
    fn default() -> Self {
        Self {
            enhance: 2000,
            translate: 1800,
            summarize: 1500,
        }
    }
}

/// Settings for the generative-text provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationSettings {
    /// Provider credential. Absent means every text operation reports
    /// "not configured".
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// REST base URL of the provider.
    pub base_url: String,
    /// Model identifiers in order of preference.
    pub models: Vec<String>,
    /// Identifier tried unconditionally when every preferred model fails
    /// construction.
    pub default_model: String,
    /// Minimum spacing between provider calls in milliseconds.
    pub min_call_interval_ms: u64,
    /// Retry ceiling and backoff for quota errors.
    pub retry: RetryConfig,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Input length caps.
    pub caps: TruncationCaps,
    /// Models exercised by the diagnostic probe.
    pub probe_models: Vec<String>,
}

impl GenerationSettings {
    /// Whether a non-empty credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            models: vec![
                "gemini-2.5-flash".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-pro".to_string(),
            ],
            default_model: "gemini-2.5-flash".to_string(),
            min_call_interval_ms: 2000,
            retry: RetryConfig::default(),
            request_timeout_ms: 60_000,
            caps: TruncationCaps::default(),
            probe_models: [
                "gemini-2.5-flash",
                "gemini-1.5-flash",
                "gemini-1.5-pro",
                "gemini-pro",
                "gemini-1.5-pro-latest",
                "gemini-1.0-pro",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
