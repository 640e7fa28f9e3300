//! JSON text endpoints: enhance, translate, summarize and live processing.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use scrivener_runtime::{EnhancementKind, TextOperationResult};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::run_detached;
use crate::error::ApiError;
use crate::state::AppState;

/// Body accepted by every text endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TextRequest {
    /// Text to operate on.
    pub text: Option<String>,
    /// Enhancement kind (`structure`, `expressions`, anything else).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Translation target.
    pub target_language: Option<String>,
}

/// Validated request: non-blank text plus the optional parameters.
struct ValidText {
    text: String,
    kind: Option<String>,
    target_language: Option<String>,
}

fn validate(
    state: &AppState,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<ValidText, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::payload_too_large(state.settings.server.max_upload_bytes)
        } else {
            warn!(error = %rejection, "unreadable text request");
            ApiError::bad_request("No text provided")
        }
    })?;
    let text = request
        .text
        .ok_or_else(|| ApiError::bad_request("No text provided"))?;
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("Empty text provided"));
    }
    Ok(ValidText {
        text,
        kind: request.kind,
        target_language: request.target_language,
    })
}

/// Failure of a single text operation, echoing the input.
fn operation_error(result: &TextOperationResult) -> ApiError {
    ApiError::internal(result.error().unwrap_or("unknown error"))
        .with_original_text(result.original_text())
}

fn target_language(state: &AppState, requested: Option<String>) -> String {
    requested
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| state.settings.pipeline.default_target_language.clone())
}

/// POST /enhance-text
pub async fn enhance(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = validate(&state, payload)?;
    let kind = req
        .kind
        .as_deref()
        .map_or(EnhancementKind::Structure, EnhancementKind::from_name);

    let result = state.operations().enhance(&req.text, kind).await;
    let Some(output) = result.output() else {
        return Err(operation_error(&result));
    };
    let mut body = json!({
        "success": true,
        "original_text": req.text,
        "enhanced_text": output,
        "fallback_used": result.fallback_used(),
    });
    if let Some(note) = result.error() {
        body["error"] = Value::String(note.to_string());
    }
    Ok(Json(body))
}

/// POST /translate-text
pub async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = validate(&state, payload)?;
    let language = target_language(&state, req.target_language);

    let result = state.operations().translate(&req.text, &language).await;
    let Some(output) = result.output() else {
        return Err(operation_error(&result));
    };
    Ok(Json(json!({
        "success": true,
        "original_text": req.text,
        "translated_text": output,
        "target_language": language,
        "translation_skipped": result.skipped(),
        "fallback_used": result.fallback_used(),
    })))
}

/// POST /summarize-text
pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = validate(&state, payload)?;

    let result = state.operations().summarize(&req.text).await;
    let Some(output) = result.output() else {
        return Err(operation_error(&result));
    };
    Ok(Json(json!({
        "success": true,
        "summary": output,
        "fallback_used": result.fallback_used(),
    })))
}

/// POST /process-live-text
///
/// Full pipeline with enhancement always on and no pause between stages.
pub async fn process_live(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = validate(&state, payload)?;
    let language = target_language(&state, req.target_language);
    info!(chars = req.text.chars().count(), target_language = %language, "processing live text");

    let pipeline = state.pipeline.with_stage_pause(Duration::ZERO);
    let text = req.text.clone();
    let result = run_detached(async move { pipeline.run(&text, &language, true).await }).await?;

    let mut fields = result.fields();
    let _ = fields.insert("original_text".into(), Value::String(req.text));
    Ok(Json(Value::Object(fields)))
}
