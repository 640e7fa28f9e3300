//! Model health tracking: rolling-window error rate per model.
//!
//! Observability only. Selection never consults it; the status endpoint
//! reports it and a `generation_model_degraded` gauge mirrors it.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;

/// Default window size for tracking recent requests.
const DEFAULT_WINDOW_SIZE: usize = 10;

/// Default error rate threshold (50%) to mark a model as degraded.
const DEFAULT_DEGRADED_THRESHOLD: f64 = 0.5;

/// Per-model health tracker. Share via `Arc<ModelHealthTracker>`.
pub struct ModelHealthTracker {
    inner: Mutex<BTreeMap<String, OutcomeWindow>>,
    window_size: usize,
    threshold: f64,
}

/// Point-in-time health of one model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelHealth {
    /// Model identifier.
    pub model: String,
    /// Calls recorded since start.
    pub total: usize,
    /// Failure fraction over the window (0.0–1.0).
    pub error_rate: f64,
    /// Whether the error rate is above the threshold.
    pub degraded: bool,
}

struct OutcomeWindow {
    outcomes: Vec<bool>,
    cursor: usize,
    total: usize,
}

impl OutcomeWindow {
    fn new(size: usize) -> Self {
        Self {
            outcomes: vec![true; size],
            cursor: 0,
            total: 0,
        }
    }

    fn record(&mut self, success: bool) {
        self.outcomes[self.cursor] = success;
        self.cursor = (self.cursor + 1) % self.outcomes.len();
        self.total += 1;
    }

    #[allow(clippy::cast_precision_loss)] // window is tiny
    fn error_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = self.outcomes.len().min(self.total);
        let failures = self.outcomes[..count].iter().filter(|&&ok| !ok).count();
        failures as f64 / count as f64
    }

    fn degraded(&self, threshold: f64) -> bool {
        self.total >= 2 && self.error_rate() > threshold
    }
}

impl ModelHealthTracker {
    /// Create a tracker with default settings.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_WINDOW_SIZE, DEFAULT_DEGRADED_THRESHOLD)
    }

    /// Create a tracker with custom window size and threshold.
    pub fn with_config(window_size: usize, threshold: f64) -> Self {
        Self {
            inner: Mutex::new(BTreeMap::new()),
            window_size: window_size.max(1),
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Record a successful call.
    pub fn record_success(&self, model: &str) {
        self.record(model, true);
    }

    /// Record a failed call.
    pub fn record_failure(&self, model: &str) {
        self.record(model, false);
    }

    /// Whether a model's error rate is above the threshold.
    pub fn is_degraded(&self, model: &str) -> bool {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.get(model).is_some_and(|w| w.degraded(self.threshold))
    }

    /// Current error rate for a model (0.0–1.0).
    pub fn error_rate(&self, model: &str) -> f64 {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.get(model).map_or(0.0, OutcomeWindow::error_rate)
    }

    /// Health of every model seen so far, ordered by identifier.
    pub fn snapshot(&self) -> Vec<ModelHealth> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner
            .iter()
            .map(|(model, w)| ModelHealth {
                model: model.clone(),
                total: w.total,
                error_rate: w.error_rate(),
                degraded: w.degraded(self.threshold),
            })
            .collect()
    }

    fn record(&self, model: &str, success: bool) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = inner
            .entry(model.to_string())
            .or_insert_with(|| OutcomeWindow::new(self.window_size));
        window.record(success);

        let rate = window.error_rate();
        let degraded = window.degraded(self.threshold);

        metrics::gauge!("generation_model_degraded", "model" => model.to_string())
            .set(if degraded { 1.0 } else { 0.0 });

        if degraded && !success {
            warn!(
                model,
                error_rate = format!("{:.0}%", rate * 100.0),
                window = self.window_size,
                "model degraded, high error rate"
            );
        }
    }
}

impl std::fmt::Debug for ModelHealthTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHealthTracker")
            .field("window_size", &self.window_size)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Default for ModelHealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
