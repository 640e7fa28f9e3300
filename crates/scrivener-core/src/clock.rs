//! Time source used for pacing, backoff, and polling.
//!
//! Every wait in the service goes through a [`Clock`] so that tests can run
//! multi-second schedules instantly. [`TokioClock`] is the production clock;
//! [`ManualClock`] advances virtual time on each `sleep` and records the
//! requested durations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

/// A source of monotonic time that can also suspend the caller.
#[async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Shared, dynamically-dispatched clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock implementation backed by `tokio::time`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl TokioClock {
    /// Create a shared handle to the tokio clock.
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock for tests.
///
/// `sleep` returns immediately after moving virtual time forward, so a
/// schedule of `1s, 2s` backoffs finishes in microseconds while `now()`
/// still reports the full elapsed span.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    state: Mutex<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    /// Create a clock whose virtual time starts at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(ManualState::default()),
        }
    }

    /// Create a shared handle, returning both the concrete and erased forms.
    pub fn shared() -> (Arc<Self>, SharedClock) {
        let clock = Arc::new(Self::new());
        let erased: SharedClock = clock.clone();
        (clock, erased)
    }

    /// Move virtual time forward without recording a sleep.
    pub fn advance(&self, by: Duration) {
        self.state.lock().elapsed += by;
    }

    /// Total virtual time elapsed since creation.
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Every duration passed to [`Clock::sleep`], in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.state.lock().elapsed
    }

    async fn sleep(&self, duration: Duration) {
        {
            let mut state = self.state.lock();
            state.elapsed += duration;
            state.sleeps.push(duration);
        }
        tokio::task::yield_now().await;
    }
}
