//! Route handlers.

pub mod status;
pub mod text;
pub mod transcribe;

use std::future::Future;

use tracing::error;

use crate::error::ApiError;

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

/// Run `work` on its own task so it finishes even if the client goes away.
async fn run_detached<T, F>(work: F) -> Result<T, ApiError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work).await.map_err(|e| {
        error!(error = %e, "request task failed");
        ApiError::internal(format!("Server error: {e}"))
    })
}
