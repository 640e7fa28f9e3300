//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `true` while the server answers.
    pub success: bool,
    /// Always `"healthy"` when the server is running.
    pub status: String,
    /// Human-readable summary.
    pub message: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
}

/// Build a health response.
pub fn health_check(start_time: Instant) -> HealthResponse {
    HealthResponse {
        success: true,
        status: "healthy".into(),
        message: "Transcription server is running".into(),
        uptime_secs: start_time.elapsed().as_secs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_healthy() {
        let resp = health_check(Instant::now());
        assert_eq!(resp.status, "healthy");
        assert!(resp.success);
    }

    #[test]
    fn uptime_increases() {
        let start = Instant::now()
            .checked_sub(std::time::Duration::from_secs(60))
            .unwrap();
        assert!(health_check(start).uptime_secs >= 59);
    }

    #[test]
    fn serialization() {
        let parsed = serde_json::to_value(health_check(Instant::now())).unwrap();
        assert_eq!(parsed["status"], "healthy");
        assert!(parsed["uptime_secs"].is_number());
        assert!(parsed["message"].is_string());
    }
}
