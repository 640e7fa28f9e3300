//! POST /transcribe: multipart upload → transcription → pipeline.
//!
//! The upload is streamed into a named temporary file that lives exactly as
//! long as the request task; dropping it removes the file on every path.

use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use scrivener_transcription::media;
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::run_detached;
use crate::error::ApiError;
use crate::state::AppState;

/// Uploaded media spooled to disk.
struct SpooledUpload {
    file: NamedTempFile,
    filename: String,
    bytes: u64,
}

impl Drop for SpooledUpload {
    fn drop(&mut self) {
        debug!(path = %self.file.path().display(), "removing temporary media");
    }
}

/// Everything the form carried.
#[derive(Default)]
struct UploadForm {
    upload: Option<SpooledUpload>,
    target_language: Option<String>,
    enhance: bool,
}

fn multipart_error(state: &AppState, e: &MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(state.settings.server.max_upload_bytes)
    } else {
        warn!(error = %e, "malformed multipart request");
        ApiError::bad_request(format!("Invalid upload: {}", e.body_text()))
    }
}

async fn spool(state: &AppState, mut field: Field<'_>) -> Result<SpooledUpload, ApiError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    if filename.trim().is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }
    let allowed = &state.settings.transcription.allowed_extensions;
    if !media::is_allowed(&filename, allowed) {
        return Err(ApiError::bad_request(format!(
            "File type not allowed. Supported formats: {}",
            allowed.join(", ")
        )));
    }

    let io_error = |e: std::io::Error| ApiError::internal(format!("Server error: {e}"));
    let file = tempfile::Builder::new()
        .prefix("scrivener_")
        .suffix(&media::temp_suffix(&filename))
        .tempfile()
        .map_err(io_error)?;
    let mut out = tokio::fs::File::from_std(file.as_file().try_clone().map_err(io_error)?);
    let mut bytes: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(state, &e))?
    {
        out.write_all(&chunk).await.map_err(io_error)?;
        bytes += chunk.len() as u64;
    }
    out.flush().await.map_err(io_error)?;

    info!(filename = %filename, bytes, "upload spooled");
    Ok(SpooledUpload {
        file,
        filename,
        bytes,
    })
}

async fn read_form(state: &AppState, mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(state, &e))?
    {
        match field.name().unwrap_or_default() {
            "file" => form.upload = Some(spool(state, field).await?),
            "target_language" => {
                let value = field.text().await.map_err(|e| multipart_error(state, &e))?;
                form.target_language = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            "enhance" => {
                let value = field.text().await.map_err(|e| multipart_error(state, &e))?;
                form.enhance = value.trim().eq_ignore_ascii_case("true");
            }
            other => debug!(field = other, "ignoring form field"),
        }
    }
    Ok(form)
}

/// POST /transcribe
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = read_form(&state, multipart).await?;
    let upload = form
        .upload
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;
    if !state.transcription.is_configured() {
        return Err(ApiError::internal("Transcription API key not configured"));
    }
    let target_language = form
        .target_language
        .unwrap_or_else(|| state.settings.pipeline.default_target_language.clone());
    let enhance = form.enhance;

    let task_state = state.clone();
    let outcome = run_detached(async move {
        let client = &task_state.transcription;
        let url = client.submit_file(upload.file.path()).await?;
        let job = client.transcribe(&url).await?;
        let transcript = job.transcript_text().to_string();
        info!(
            filename = %upload.filename,
            bytes = upload.bytes,
            chars = transcript.chars().count(),
            "transcription ready"
        );

        let result = task_state
            .pipeline
            .run(&transcript, &target_language, enhance)
            .await;
        let mut fields = result.fields();
        let _ = fields.insert("transcript".into(), Value::String(transcript));
        let _ = fields.insert("confidence".into(), serde_json::json!(job.confidence));
        let _ = fields.insert("filename".into(), Value::String(upload.filename.clone()));
        Ok::<_, ApiError>(Value::Object(fields))
    })
    .await?;

    Ok(Json(outcome?))
}
