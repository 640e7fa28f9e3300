//! # Provider Trait
//!
//! Core abstraction for generative-text backends. A backend exposes an
//! ordered model catalog, a cheap local construction step that yields a
//! [`ModelHandle`], and a single-shot `generate` call.
//!
//! Errors are classified by variant first and then by their rendered text
//! (see [`ProviderError::failure_class`]) so that callers can decide between
//! degrading, retrying and failing without knowing the backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur during provider operations.
///
/// Variants produced from an HTTP response always include the status code
/// in their `Display` output. Transport errors never carry the request URL.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No credential is configured for the provider.
    #[error("generation provider not configured")]
    NotConfigured,

    /// Model identifier rejected during construction.
    #[error("invalid model identifier: {model}")]
    InvalidModel {
        /// The rejected identifier.
        model: String,
    },

    /// Rate limited by the provider.
    #[error("Rate limited (429): {message}")]
    RateLimited {
        /// Error description.
        message: String,
    },

    /// Provider returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
        /// Whether the status suggests a retry may succeed.
        retryable: bool,
    },

    /// Provider-specific error.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

/// How a text operation should react to a provider failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// The requested model is gone. Degrade immediately.
    ModelUnavailable,
    /// Quota or rate exhaustion. Retry with backoff, then degrade.
    QuotaExceeded,
    /// Anything else. Surface the error.
    Unclassified,
}

impl FailureClass {
    /// Classify a rendered provider error message.
    ///
    /// `404` together with `model` means the model is unavailable; `429` or
    /// `quota` means quota exhaustion. Matching is case-insensitive.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("404") && lower.contains("model") {
            Self::ModelUnavailable
        } else if lower.contains("429") || lower.contains("quota") {
            Self::QuotaExceeded
        } else {
            Self::Unclassified
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelUnavailable => "model_unavailable",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Unclassified => "unclassified",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl ProviderError {
    /// Failure class of this error.
    ///
    /// Transport, parse and configuration errors are never quota or model
    /// failures, whatever their text says. Rate limiting is always quota.
    /// Everything else is classified by its rendered text.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::Http(_) | Self::Json(_) | Self::NotConfigured | Self::InvalidModel { .. } => {
                FailureClass::Unclassified
            }
            Self::RateLimited { .. } => FailureClass::QuotaExceeded,
            Self::Api { .. } | Self::Other { .. } => FailureClass::from_message(&self.to_string()),
        }
    }
}

/// A generative-text model candidate.
///
/// Produced by [`GenerativeBackend::construct`]; never cached across
/// selections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHandle {
    /// Model identifier (e.g. `"gemini-2.5-flash"`).
    pub name: String,
    /// Whether construction succeeded.
    pub usable: bool,
}

impl ModelHandle {
    /// Handle for a model that passed construction.
    pub fn usable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usable: true,
        }
    }
}

/// Generative-text backend.
///
/// Implementors must be `Send + Sync` for use across request tasks.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Backend identifier (e.g. `"gemini"`).
    fn name(&self) -> &str;

    /// Whether a credential is available.
    fn is_configured(&self) -> bool;

    /// Model identifiers in order of preference.
    fn list_models(&self) -> Vec<String>;

    /// Identifier tried unconditionally when every preferred model fails.
    fn default_model(&self) -> &str;

    /// Cheap local construction of a handle. No network round trip.
    fn construct(&self, model: &str) -> ProviderResult<ModelHandle>;

    /// Single-shot text generation.
    async fn generate(&self, handle: &ModelHandle, prompt: &str) -> ProviderResult<String>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn not_found_model_is_unavailable() {
        let err = ProviderError::Api {
            status: 404,
            message: "models/gemini-pro is not found for API version v1beta".into(),
            code: Some("NOT_FOUND".into()),
            retryable: false,
        };
        assert_eq!(err.failure_class(), FailureClass::ModelUnavailable);
    }

    #[test]
    fn rate_limited_is_quota() {
        let err = ProviderError::RateLimited {
            message: "Resource has been exhausted".into(),
        };
        assert_eq!(err.to_string(), "Rate limited (429): Resource has been exhausted");
        assert_eq!(err.failure_class(), FailureClass::QuotaExceeded);
    }

    #[test]
    fn quota_word_is_quota_regardless_of_status() {
        let err = ProviderError::Api {
            status: 403,
            message: "Quota exceeded for project".into(),
            code: None,
            retryable: false,
        };
        assert_eq!(err.failure_class(), FailureClass::QuotaExceeded);
    }

    #[test]
    fn not_found_without_model_is_unclassified() {
        let err = ProviderError::Api {
            status: 404,
            message: "no such route".into(),
            code: None,
            retryable: false,
        };
        assert_eq!(err.failure_class(), FailureClass::Unclassified);
    }

    #[test]
    fn server_error_is_unclassified() {
        let err = ProviderError::Api {
            status: 500,
            message: "Internal error".into(),
            code: None,
            retryable: true,
        };
        assert_eq!(err.failure_class(), FailureClass::Unclassified);
    }

    #[test]
    fn not_configured_display() {
        let err = ProviderError::NotConfigured;
        assert_eq!(err.to_string(), "generation provider not configured");
        assert_eq!(err.failure_class(), FailureClass::Unclassified);
    }

    #[test]
    fn invalid_model_text_does_not_classify() {
        let err = ProviderError::InvalidModel {
            model: "model-404-quota".into(),
        };
        assert_eq!(err.failure_class(), FailureClass::Unclassified);
    }

    #[tokio::test]
    async fn transport_error_is_unclassified_even_when_url_looks_like_a_missing_model() {
        let raw = reqwest::Client::new()
            .post("http://127.0.0.1:9/v404/models/gemini-pro:generateContent?quota=1")
            .send()
            .await
            .unwrap_err();
        let err = ProviderError::Http(raw);
        assert!(err.to_string().contains("404"));
        assert_eq!(err.failure_class(), FailureClass::Unclassified);
    }

    #[tokio::test]
    async fn transport_error_drops_request_url() {
        let raw = reqwest::Client::new()
            .post("http://127.0.0.1:9/models/x:generateContent?key=secret-value")
            .send()
            .await
            .unwrap_err();
        let err = ProviderError::from(raw);
        assert!(!err.to_string().contains("secret-value"));
        assert!(!err.to_string().contains("127.0.0.1"));
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            FailureClass::from_message("404 MODEL NOT FOUND"),
            FailureClass::ModelUnavailable
        );
        assert_eq!(
            FailureClass::from_message("QUOTA exhausted"),
            FailureClass::QuotaExceeded
        );
    }

    #[test]
    fn failure_class_labels() {
        assert_eq!(FailureClass::ModelUnavailable.as_str(), "model_unavailable");
        assert_eq!(FailureClass::QuotaExceeded.as_str(), "quota_exceeded");
        assert_eq!(FailureClass::Unclassified.as_str(), "unclassified");
    }

    #[test]
    fn backend_is_object_safe() {
        fn assert_object_safe(_: &dyn GenerativeBackend) {}
        let _ = assert_object_safe;
    }

    #[test]
    fn backend_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn GenerativeBackend>();
    }

    proptest! {
        #[test]
        fn rate_limited_always_quota(message in "[a-z ]{0,40}") {
            let err = ProviderError::RateLimited { message };
            prop_assert_eq!(err.failure_class(), FailureClass::QuotaExceeded);
        }

        #[test]
        fn text_without_markers_is_unclassified(message in "[a-z ]{0,40}") {
            prop_assume!(!message.contains("quota"));
            prop_assert_eq!(FailureClass::from_message(&message), FailureClass::Unclassified);
        }
    }
}
