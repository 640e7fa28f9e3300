//! Gemini API request/response types and backend configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default base URL for API-key access.
pub const DEFAULT_API_KEY_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Identifier used when every preferred model fails construction.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Gemini backend configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key. `None` leaves the backend unconfigured.
    pub api_key: Option<String>,
    /// REST base URL (no trailing slash).
    pub base_url: String,
    /// Model identifiers in order of preference.
    pub models: Vec<String>,
    /// Last-resort model identifier.
    pub default_model: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl GeminiConfig {
    /// Configuration with the stock model list and the given key.
    pub fn with_api_key(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_KEY_BASE_URL.to_string(),
            models: vec![
                "gemini-2.5-flash".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-pro".to_string(),
            ],
            default_model: DEFAULT_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("default_model", &self.default_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gemini API types
// ─────────────────────────────────────────────────────────────────────────────

/// `generateContent` request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation contents (a single user turn here).
    pub contents: Vec<GeminiContent>,
}

impl GenerateContentRequest {
    /// Request with one user turn carrying `prompt`.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

/// Content message in Gemini API format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// The role (`user` or `model`).
    #[serde(default)]
    pub role: String,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A content part. Only text parts are used.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `generateContent` response body.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Prompt-level feedback (present when the prompt was blocked).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// A response candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// The content of this candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<GeminiContent>,
    /// Finish reason (e.g. `STOP`, `MAX_TOKENS`, `SAFETY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Prompt feedback.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}
