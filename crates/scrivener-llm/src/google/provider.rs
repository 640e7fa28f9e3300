//! Gemini backend implementing [`GenerativeBackend`].
//!
//! Construction only validates the identifier and the presence of a key;
//! the first network round trip happens in [`GenerativeBackend::generate`].
//! Non-2xx responses are mapped so that their rendered text carries the
//! status code, which is what failure classification keys on. The key
//! travels in the `x-goog-api-key` header, never in the URL.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use scrivener_core::parse_api_error;
use tracing::{debug, error, instrument};

use crate::provider::{GenerativeBackend, ModelHandle, ProviderError, ProviderResult};

use super::types::{GeminiConfig, GenerateContentRequest, GenerateContentResponse};

/// Accepted model identifier shape: lower-case alphanumerics, dots and dashes.
static MODEL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9.\-]*$").expect("valid model id regex"));

/// Google Gemini backend.
pub struct GeminiBackend {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Create a backend with its own HTTP client.
    pub fn new(config: GeminiConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Create a backend with a shared HTTP client.
    pub fn with_client(config: GeminiConfig, client: reqwest::Client) -> Self {
        debug!(
            configured = config.api_key.is_some(),
            models = ?config.models,
            "Gemini backend initialized"
        );
        Self { config, client }
    }

    /// Backend configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn api_key(&self) -> ProviderResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::NotConfigured)
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    fn list_models(&self) -> Vec<String> {
        self.config.models.clone()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn construct(&self, model: &str) -> ProviderResult<ModelHandle> {
        let _ = self.api_key()?;
        if !MODEL_ID.is_match(model) {
            return Err(ProviderError::InvalidModel {
                model: model.to_string(),
            });
        }
        Ok(ModelHandle::usable(model))
    }

    #[instrument(skip_all, fields(model = %handle.name))]
    async fn generate(&self, handle: &ModelHandle, prompt: &str) -> ProviderResult<String> {
        let key = self.api_key()?;
        let body = GenerateContentRequest::from_prompt(prompt);

        debug!(prompt_chars = prompt.chars().count(), "sending generateContent");

        let response = self
            .client
            .post(self.generate_url(&handle.name))
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let info = parse_api_error(&body_text, status.as_u16());
            error!(
                status = status.as_u16(),
                code = info.code.as_deref().unwrap_or("unknown"),
                retryable = info.retryable,
                "Gemini API error"
            );
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited {
                    message: info.message,
                });
            }
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: info.message,
                code: info.code,
                retryable: info.retryable,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.text().ok_or_else(|| {
            let reason = parsed
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.clone())
                .or_else(|| parsed.candidates.first().and_then(|c| c.finish_reason.clone()))
                .unwrap_or_else(|| "no candidates".to_string());
            ProviderError::Other {
                message: format!("empty response from model: {reason}"),
            }
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
