//! Enhance, translate and summarize through the generative-text provider.
//!
//! Every operation follows one procedure: credential gate, optional
//! short-circuit, truncation to a per-operation cap, then a loop of
//! rate-limit → select → generate. Provider failures are classified:
//!
//! - model unavailable: degrade to the local fallback at once
//! - quota / 429: back off and retry up to `max_retries`, then degrade
//! - anything else: fail with the provider's message, no fallback
//!
//! Nothing escapes as an error; every path yields a [`TextOperationResult`].

mod prompts;
mod result;

use std::borrow::Cow;
use std::sync::Arc;

use scrivener_core::text::truncate_with_ellipsis;
use scrivener_core::{RetryConfig, SharedClock};
use scrivener_llm::{FailureClass, ModelHealthTracker, ProviderSelector, RateLimiter};
use scrivener_settings::TruncationCaps;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

pub use result::TextOperationResult;

use crate::fallback::{self, EnhancementKind, QUOTA_MARKER, UNAVAILABLE_EXCERPT_MARKER, UNAVAILABLE_MARKER};

/// Error reported when no generation credential is configured.
pub const NOT_CONFIGURED: &str = "Gemini API key not configured";

/// Target languages that mean "leave the text as it is".
pub const NOOP_LANGUAGES: [&str; 4] = ["english", "en", "auto", "original"];

/// Whether translating into `target_language` is a no-op.
pub fn is_noop_language(target_language: &str) -> bool {
    let target = target_language.trim();
    NOOP_LANGUAGES.iter().any(|l| l.eq_ignore_ascii_case(target))
}

/// A text operation and its parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    /// Rewrite the text.
    Enhance {
        /// Kind of rewrite.
        kind: EnhancementKind,
    },
    /// Translate into a target language.
    Translate {
        /// Human-readable language name (e.g. `"Spanish"`).
        target_language: String,
    },
    /// Condense to a few sentences.
    Summarize,
}

impl Operation {
    /// Label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enhance { .. } => "enhance",
            Self::Translate { .. } => "translate",
            Self::Summarize => "summarize",
        }
    }

    fn cap(&self, caps: &TruncationCaps) -> usize {
        match self {
            Self::Enhance { .. } => caps.enhance,
            Self::Translate { .. } => caps.translate,
            Self::Summarize => caps.summarize,
        }
    }

    fn prompt(&self, text: &str) -> String {
        match self {
            Self::Enhance { kind } => prompts::enhance(*kind, text),
            Self::Translate { target_language } => prompts::translate(target_language, text),
            Self::Summarize => prompts::summarize(text),
        }
    }

    /// Local output when the provider cannot serve the request.
    fn fallback(&self, text: &str, class: FailureClass) -> String {
        let quota = class == FailureClass::QuotaExceeded;
        match self {
            Self::Enhance { kind } => fallback::basic_text_enhancement(text, *kind),
            Self::Translate { target_language } if quota => {
                format!("{text} [Translation to {target_language} failed due to API limits]")
            }
            Self::Translate { target_language } => {
                format!("{text} [Translation to {target_language} not available]")
            }
            Self::Summarize if quota => fallback::excerpt(text, QUOTA_MARKER, QUOTA_MARKER),
            Self::Summarize => {
                fallback::excerpt(text, UNAVAILABLE_EXCERPT_MARKER, UNAVAILABLE_MARKER)
            }
        }
    }

    fn unavailable_note(&self) -> &'static str {
        match self {
            Self::Enhance { .. } => "AI model not available, using basic enhancement",
            Self::Translate { .. } => "AI model not available for translation",
            Self::Summarize => "AI model not available for summary",
        }
    }
}

/// Runs [`Operation`]s against the selected provider model.
///
/// Cheap to clone; clones share the rate limiter and health tracker.
#[derive(Clone)]
pub struct TextOperation {
    selector: ProviderSelector,
    limiter: Arc<RateLimiter>,
    clock: SharedClock,
    health: Arc<ModelHealthTracker>,
    caps: TruncationCaps,
    retry: RetryConfig,
}

impl TextOperation {
    /// Create an engine with default caps and retry policy.
    pub fn new(selector: ProviderSelector, limiter: Arc<RateLimiter>, clock: SharedClock) -> Self {
        Self {
            selector,
            limiter,
            clock,
            health: Arc::new(ModelHealthTracker::new()),
            caps: TruncationCaps::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Override the truncation caps.
    #[must_use]
    pub fn with_caps(mut self, caps: TruncationCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Override the quota retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Record model outcomes into a shared tracker.
    #[must_use]
    pub fn with_health(mut self, health: Arc<ModelHealthTracker>) -> Self {
        self.health = health;
        self
    }

    /// The model selector.
    pub fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    /// The shared rate limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Per-model outcome tracker.
    pub fn health(&self) -> &Arc<ModelHealthTracker> {
        &self.health
    }

    /// Whether the provider has a credential.
    pub fn is_configured(&self) -> bool {
        self.selector.backend().is_configured()
    }

    /// Rewrite `text` according to `kind`.
    pub async fn enhance(&self, text: &str, kind: EnhancementKind) -> TextOperationResult {
        self.run(&Operation::Enhance { kind }, text).await
    }

    /// Translate `text` into `target_language`.
    pub async fn translate(&self, text: &str, target_language: &str) -> TextOperationResult {
        let op = Operation::Translate {
            target_language: target_language.to_string(),
        };
        self.run(&op, text).await
    }

    /// Summarize `text`.
    pub async fn summarize(&self, text: &str) -> TextOperationResult {
        self.run(&Operation::Summarize, text).await
    }

    /// Run `op` over `text`.
    #[instrument(skip_all, fields(operation = op.name()))]
    pub async fn run(&self, op: &Operation, text: &str) -> TextOperationResult {
        let name = op.name();
        metrics::counter!("generation_requests_total", "operation" => name).increment(1);

        if !self.is_configured() {
            warn!("generation provider not configured");
            return TextOperationResult::failed(text, NOT_CONFIGURED, 0);
        }
        if let Operation::Translate { target_language } = op {
            if is_noop_language(target_language) {
                info!(target_language = %target_language, "translation not needed");
                return TextOperationResult::passthrough(text);
            }
        }

        let cap = op.cap(&self.caps);
        let input = truncate_with_ellipsis(text, cap);
        if matches!(input, Cow::Owned(_)) {
            info!(cap, chars = text.chars().count(), "input truncated");
        }
        let prompt = op.prompt(&input);

        let mut retry_count: u32 = 0;
        loop {
            let _ = self.limiter.acquire().await;

            let handle = match self.selector.select() {
                Ok(handle) => handle,
                Err(e) => {
                    error!(error = %e, "no generation model could be constructed");
                    return TextOperationResult::failed(input, e.to_string(), retry_count);
                }
            };

            let err = match self.selector.backend().generate(&handle, &prompt).await {
                Ok(output) => {
                    self.health.record_success(&handle.name);
                    return TextOperationResult::generated(
                        input,
                        output.trim(),
                        retry_count,
                        handle.name,
                    );
                }
                Err(e) => e,
            };
            self.health.record_failure(&handle.name);

            let class = err.failure_class();
            match class {
                FailureClass::ModelUnavailable => {
                    warn!(model = %handle.name, error = %err, "model unavailable, using fallback");
                    record_fallback(name, class);
                    return TextOperationResult::degraded(
                        input.as_ref(),
                        op.fallback(&input, class),
                        retry_count,
                        Some(op.unavailable_note().to_string()),
                    );
                }
                FailureClass::QuotaExceeded if retry_count < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry_count);
                    retry_count += 1;
                    info!(
                        attempt = retry_count,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "quota exceeded, retrying"
                    );
                    metrics::counter!("generation_retries_total", "operation" => name).increment(1);
                    self.clock.sleep(delay).await;
                }
                FailureClass::QuotaExceeded => {
                    warn!(retries = retry_count, error = %err, "quota retries exhausted, using fallback");
                    record_fallback(name, class);
                    return TextOperationResult::degraded(
                        input.as_ref(),
                        op.fallback(&input, class),
                        retry_count,
                        None,
                    );
                }
                FailureClass::Unclassified => {
                    error!(model = %handle.name, error = %err, "generation failed");
                    return TextOperationResult::failed(input, err.to_string(), retry_count);
                }
            }
        }
    }
}

impl std::fmt::Debug for TextOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextOperation")
            .field("backend", &self.selector.backend().name())
            .field("caps", &self.caps)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn record_fallback(operation: &'static str, class: FailureClass) {
    metrics::counter!(
        "generation_fallbacks_total",
        "operation" => operation,
        "reason" => class.as_str()
    )
    .increment(1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
