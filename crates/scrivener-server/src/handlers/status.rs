//! Health, provider status, model probe and metrics.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::health::{self, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}

/// GET /api-status
pub async fn api_status(State(state): State<AppState>) -> Json<Value> {
    let ops = state.operations();
    let backend = ops.selector().backend();
    let selected_model = if backend.is_configured() {
        ops.selector().select().ok().map(|h| h.name)
    } else {
        None
    };

    Json(json!({
        "success": true,
        "transcription": {
            "provider": state.transcription.provider_name(),
            "configured": state.transcription.is_configured(),
        },
        "generation": {
            "provider": backend.name(),
            "configured": backend.is_configured(),
            "selected_model": selected_model,
            "models": backend.list_models(),
            "min_call_interval_ms": u64::try_from(ops.limiter().min_interval().as_millis()).unwrap_or(u64::MAX),
            "model_health": ops.health().snapshot(),
        },
    }))
}

/// GET /test-models
pub async fn test_models(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let ops = state.operations();
    if !ops.is_configured() {
        return Err(ApiError::bad_request(scrivener_runtime::operation::NOT_CONFIGURED));
    }
    let report = ops
        .selector()
        .probe(&state.settings.generation.probe_models, ops.limiter())
        .await;
    Ok(Json(json!({
        "success": true,
        "results": report.results,
        "recommended": report.recommended,
    })))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state
        .metrics
        .as_ref()
        .map(crate::metrics::render)
        .unwrap_or_default();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
