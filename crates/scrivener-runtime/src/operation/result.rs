//! Outcome of one text operation.

use serde::Serialize;

/// Outcome of one enhance / translate / summarize call.
///
/// Constructed only through the named constructors, which keep two
/// invariants: a failed result never carries output, and a degraded
/// (`fallback_used`) result is always successful.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextOperationResult {
    success: bool,
    output: Option<String>,
    original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    fallback_used: bool,
    retries_used: u32,
    skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

impl TextOperationResult {
    /// Provider output.
    pub fn generated(
        original_text: impl Into<String>,
        output: impl Into<String>,
        retries_used: u32,
        model: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            original_text: original_text.into(),
            error: None,
            fallback_used: false,
            retries_used,
            skipped: false,
            model: Some(model.into()),
        }
    }

    /// Local fallback output, with an optional note on why.
    pub fn degraded(
        original_text: impl Into<String>,
        output: impl Into<String>,
        retries_used: u32,
        note: Option<String>,
    ) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            original_text: original_text.into(),
            error: note,
            fallback_used: true,
            retries_used,
            skipped: false,
            model: None,
        }
    }

    /// Hard failure. No output is produced.
    pub fn failed(original_text: impl Into<String>, error: impl Into<String>, retries_used: u32) -> Self {
        Self {
            success: false,
            output: None,
            original_text: original_text.into(),
            error: Some(error.into()),
            fallback_used: false,
            retries_used,
            skipped: false,
            model: None,
        }
    }

    /// The operation had nothing to do; the text passes through.
    pub fn passthrough(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            success: true,
            output: Some(text.clone()),
            original_text: text,
            error: None,
            fallback_used: false,
            retries_used: 0,
            skipped: true,
            model: None,
        }
    }

    /// Whether usable output was produced.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Output text; `None` exactly when `success` is false.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Text the operation worked on, after truncation.
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// Failure message, or a note on degraded output.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the output came from the local fallback.
    pub fn fallback_used(&self) -> bool {
        self.fallback_used
    }

    /// Quota retries performed.
    pub fn retries_used(&self) -> u32 {
        self.retries_used
    }

    /// Whether the operation short-circuited without a provider call.
    pub fn skipped(&self) -> bool {
        self.skipped
    }

    /// Model that produced the output.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}
