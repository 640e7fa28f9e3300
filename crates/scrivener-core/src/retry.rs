//! Retry configuration and backoff calculation.
//!
//! Portable, sync-only pieces of the retry story. The async loop that
//! actually sleeps and re-invokes the provider lives in `scrivener-runtime`.
//!
//! - [`RetryConfig`]: retry ceiling and backoff parameters
//! - [`calculate_backoff_delay`]: exponential backoff with optional jitter

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default base delay in milliseconds (first backoff is one base unit).
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
/// Default maximum delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;

/// Configuration for retry logic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Retries allowed after the first attempt (default: 2).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff in ms (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Maximum delay between retries in ms (default: 60000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Jitter factor 0.0–1.0 (default: 0.0, fully deterministic).
    #[serde(default)]
    pub jitter_factor: f64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_factor: 0.0,
        }
    }
}

impl RetryConfig {
    /// Backoff before the retry that follows attempt `retry_count` (zero-based).
    pub fn delay_for(&self, retry_count: u32) -> std::time::Duration {
        std::time::Duration::from_millis(calculate_backoff_delay(
            retry_count,
            self.base_delay_ms,
            self.max_delay_ms,
            self.jitter_factor,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backoff calculation
// ─────────────────────────────────────────────────────────────────────────────

/// Calculate exponential backoff delay.
///
/// Formula: `min(max_delay, base_delay * 2^retry_count) * (1 + jitter)`
///
/// With the default configuration this yields 1000 ms, then 2000 ms. The
/// jitter term is the upper bound of the range; with `jitter_factor = 0.0`
/// the result is exact.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn calculate_backoff_delay(
    retry_count: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_factor: f64,
) -> u64 {
    let exponential = base_delay_ms.saturating_mul(1u64 << retry_count.min(31));
    let capped = exponential.min(max_delay_ms);

    if jitter_factor <= 0.0 {
        return capped;
    }

    let with_jitter = (capped as f64) * (1.0 + jitter_factor.min(1.0));
    with_jitter.round() as u64
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
