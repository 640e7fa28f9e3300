//! Error envelope returned by every failing endpoint, and startup errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scrivener_llm::ProviderError;
use scrivener_transcription::TranscriptionError;
use serde_json::{Value, json};

/// A request that could not be served.
///
/// Renders as `{"success": false, "error": ...}` (plus `original_text` when
/// the caller's text is echoed back).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
    original_text: Option<String>,
}

impl ApiError {
    /// Error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            original_text: None,
        }
    }

    /// 400.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 413 naming the limit in whole megabytes.
    pub fn payload_too_large(limit_bytes: usize) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, too_large_message(limit_bytes))
    }

    /// 500.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Echo the caller's text back alongside the error.
    #[must_use]
    pub fn with_original_text(mut self, text: impl Into<String>) -> Self {
        self.original_text = Some(text.into());
        self
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message placed in `error`.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn body(&self) -> Value {
        let mut body = json!({ "success": false, "error": self.message });
        if let Some(text) = &self.original_text {
            body["original_text"] = Value::String(text.clone());
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        metrics::counter!(crate::metrics::HTTP_ERRORS_TOTAL, "status" => self.status.as_u16().to_string())
            .increment(1);
        (self.status, Json(self.body())).into_response()
    }
}

impl From<TranscriptionError> for ApiError {
    fn from(e: TranscriptionError) -> Self {
        Self::internal(e.to_string())
    }
}

/// `File too large. Maximum size is 100MB.`
pub fn too_large_message(limit_bytes: usize) -> String {
    format!(
        "File too large. Maximum size is {}MB.",
        limit_bytes / (1024 * 1024)
    )
}

/// Failures while wiring the server at startup.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Generation backend could not be built.
    #[error("generation provider: {0}")]
    Provider(#[from] ProviderError),

    /// Transcription backend could not be built.
    #[error("transcription provider: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
