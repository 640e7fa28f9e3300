//! Minimum spacing between generative-text calls.
//!
//! One [`RateLimiter`] is shared by every text operation in the process.
//! The lock is held across the sleep, so concurrent callers queue on the
//! mutex and each grant is at least `min_interval` after the previous one.

use std::time::Duration;

use scrivener_core::SharedClock;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

/// Default spacing between provider calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Process-wide pacing gate for provider calls.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    clock: SharedClock,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with an empty history.
    pub fn new(min_interval: Duration, clock: SharedClock) -> Self {
        Self {
            min_interval,
            clock,
            last_grant: Mutex::new(None),
        }
    }

    /// Configured spacing.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until `min_interval` has passed since the previous grant, then
    /// record and return the new grant instant.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_grant.lock().await;
        if let Some(previous) = *last {
            let elapsed = self.clock.now().saturating_duration_since(previous);
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                info!(
                    sleep_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    "rate limiting generation call"
                );
                self.clock.sleep(wait).await;
            }
        }
        let granted = self.clock.now();
        *last = Some(granted);
        granted
    }

    /// Instant of the most recent grant, if any.
    pub async fn last_grant(&self) -> Option<Instant> {
        *self.last_grant.lock().await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
