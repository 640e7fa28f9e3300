//! Error bodies returned by the generation and speech-to-text APIs.
//!
//! Recognized shapes:
//! - nested: `{"error": {"message": "...", "status"|"type": "..."}}` (Gemini)
//! - flat:   `{"error": "..."}` (AssemblyAI)
//! - detail: `{"detail": "..."}` or `{"message": "...", "code": "..."}`
//!
//! Anything else becomes `HTTP <status>: <body>` with the body cut to
//! [`RAW_BODY_CHARS`] characters.

use serde::Deserialize;

use crate::text::truncate_with_ellipsis;

/// Longest raw body quoted in an error message.
pub const RAW_BODY_CHARS: usize = 300;

/// Parsed API error information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Provider-specific error code (e.g. `"RESOURCE_EXHAUSTED"`).
    pub code: Option<String>,
    /// Whether the status suggests a retry may succeed (429 or 5xx).
    pub retryable: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Nested { error: NestedError },
    Flat { error: String },
    Detail { detail: String },
    Message {
        message: String,
        #[serde(default, alias = "type")]
        code: Option<String>,
    },
}

#[derive(Deserialize)]
struct NestedError {
    message: String,
    #[serde(default, alias = "type")]
    status: Option<String>,
}

impl Envelope {
    fn into_parts(self) -> (String, Option<String>) {
        match self {
            Self::Nested { error } => (error.message, error.status),
            Self::Flat { error } => (error, None),
            Self::Detail { detail } => (detail, None),
            Self::Message { message, code } => (message, code),
        }
    }
}

/// Parse an error response body.
pub fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    let retryable = status == 429 || status >= 500;
    let (message, code) = match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.into_parts(),
        Err(_) => (
            format!("HTTP {status}: {}", truncate_with_ellipsis(body, RAW_BODY_CHARS)),
            None,
        ),
    };
    ApiErrorInfo {
        message,
        code,
        retryable,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_not_found() {
        let body = r#"{"error":{"code":404,"status":"NOT_FOUND","message":"models/gemini-pro is not found"}}"#;
        let info = parse_api_error(body, 404);
        assert_eq!(info.message, "models/gemini-pro is not found");
        assert_eq!(info.code.as_deref(), Some("NOT_FOUND"));
        assert!(!info.retryable);
    }

    #[test]
    fn gemini_quota() {
        let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED","message":"Quota exceeded"}}"#;
        let info = parse_api_error(body, 429);
        assert_eq!(info.code.as_deref(), Some("RESOURCE_EXHAUSTED"));
        assert!(info.retryable);
    }

    #[test]
    fn nested_type_is_code() {
        let body = r#"{"error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let info = parse_api_error(body, 503);
        assert_eq!(info.code.as_deref(), Some("overloaded_error"));
    }

    #[test]
    fn assemblyai_flat_error() {
        let body = r#"{"error":"Authentication error, API token missing/invalid"}"#;
        let info = parse_api_error(body, 401);
        assert_eq!(info.message, "Authentication error, API token missing/invalid");
        assert!(info.code.is_none());
        assert!(!info.retryable);
    }

    #[test]
    fn detail_and_message_shapes() {
        assert_eq!(parse_api_error(r#"{"detail":"Model not found"}"#, 404).message, "Model not found");
        let info = parse_api_error(r#"{"message":"Invalid model","code":"model_not_found"}"#, 400);
        assert_eq!(info.message, "Invalid model");
        assert_eq!(info.code.as_deref(), Some("model_not_found"));
    }

    #[test]
    fn unrecognized_json_is_quoted() {
        let info = parse_api_error(r#"{"error":{}}"#, 400);
        assert_eq!(info.message, r#"HTTP 400: {"error":{}}"#);
    }

    #[test]
    fn plain_text_and_empty_bodies() {
        assert_eq!(parse_api_error("Bad Gateway", 502).message, "HTTP 502: Bad Gateway");
        let empty = parse_api_error("", 500);
        assert_eq!(empty.message, "HTTP 500: ");
        assert!(empty.retryable);
    }

    #[test]
    fn long_html_body_is_cut() {
        let body = format!("<html>{}</html>", "x".repeat(1000));
        let info = parse_api_error(&body, 502);
        assert!(info.message.ends_with("..."));
        assert_eq!(info.message.chars().count(), "HTTP 502: ".len() + RAW_BODY_CHARS + 3);
    }
}
