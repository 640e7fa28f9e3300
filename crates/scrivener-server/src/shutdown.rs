//! Graceful shutdown coordination via `CancellationToken`.
//!
//! Cancelling stops the listener from accepting; requests already in flight
//! (including their pipelines) are drained up to a timeout.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default time allowed for in-flight requests to finish.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared shutdown signal for the listener and its tasks.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the underlying token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Future resolving once shutdown starts, for `with_graceful_shutdown`.
    pub fn signal(&self) -> impl Future<Output = ()> + Send + 'static {
        self.token.clone().cancelled_owned()
    }

    /// Start shutting down. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has started.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signal shutdown, then wait up to `timeout` for `handles` to finish.
    pub async fn drain(&self, handles: Vec<JoinHandle<()>>, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);
        self.shutdown();
        info!(
            task_count = handles.len(),
            timeout_secs = timeout.as_secs(),
            "draining in-flight requests"
        );
        if tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_err()
        {
            warn!("drain timed out after {timeout:?}, abandoning remaining requests");
        }
    }
}
