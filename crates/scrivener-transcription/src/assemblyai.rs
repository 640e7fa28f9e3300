//! AssemblyAI REST backend.
//!
//! - `POST {base}/v2/upload` with the raw media body → `{"upload_url"}`
//! - `POST {base}/v2/transcript` with `{"audio_url", "speech_model"}` → `{"id"}`
//! - `GET {base}/v2/transcript/{id}` → status document
//!
//! Every request carries the key in the `authorization` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use scrivener_core::parse_api_error;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::backend::SpeechToText;
use crate::types::{JobSnapshot, TranscriptionError};

/// Default REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com";

/// AssemblyAI backend configuration.
#[derive(Clone)]
pub struct AssemblyAiConfig {
    /// API key. `None` leaves the backend unconfigured.
    pub api_key: Option<String>,
    /// REST base URL (no trailing slash).
    pub base_url: String,
    /// Speech model requested for each job.
    pub speech_model: String,
    /// Per-request timeout (uploads included).
    pub request_timeout: Duration,
}

impl Default for AssemblyAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            speech_model: "universal".to_string(),
            request_timeout: Duration::from_secs(600),
        }
    }
}

impl std::fmt::Debug for AssemblyAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("speech_model", &self.speech_model)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Deserialize)]
struct CreateJobResponse {
    id: String,
}

/// AssemblyAI speech-to-text backend.
pub struct AssemblyAiBackend {
    config: AssemblyAiConfig,
    client: reqwest::Client,
}

impl AssemblyAiBackend {
    /// Create a backend with its own HTTP client.
    pub fn new(config: AssemblyAiConfig) -> Result<Self, TranscriptionError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Create a backend with a shared HTTP client.
    pub fn with_client(config: AssemblyAiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn auth_header(&self) -> Result<HeaderValue, TranscriptionError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(TranscriptionError::NotConfigured)?;
        HeaderValue::from_str(key).map_err(|_| TranscriptionError::NotConfigured)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }
}

/// Status code and parsed message of a non-2xx response.
async fn failure(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, parse_api_error(&body, status).message)
}

#[async_trait]
impl SpeechToText for AssemblyAiBackend {
    fn name(&self) -> &str {
        "assemblyai"
    }

    fn is_configured(&self) -> bool {
        self.auth_header().is_ok()
    }

    #[instrument(skip_all)]
    async fn upload(&self, media: reqwest::Body) -> Result<String, TranscriptionError> {
        let response = self
            .client
            .post(self.url("/v2/upload"))
            .header(AUTHORIZATION, self.auth_header()?)
            .body(media)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            return Err(TranscriptionError::Upload { status, message });
        }
        let parsed: UploadResponse = serde_json::from_slice(&response.bytes().await?)?;
        debug!("media uploaded");
        Ok(parsed.upload_url)
    }

    #[instrument(skip_all)]
    async fn create_job(&self, audio_url: &str) -> Result<String, TranscriptionError> {
        let body = serde_json::json!({
            "audio_url": audio_url,
            "speech_model": self.config.speech_model,
        });
        let response = self
            .client
            .post(self.url("/v2/transcript"))
            .header(AUTHORIZATION, self.auth_header()?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            return Err(TranscriptionError::Submit { status, message });
        }
        let parsed: CreateJobResponse = serde_json::from_slice(&response.bytes().await?)?;
        Ok(parsed.id)
    }

    #[instrument(skip_all, fields(job_id = %job_id))]
    async fn get_job(&self, job_id: &str) -> Result<JobSnapshot, TranscriptionError> {
        let response = self
            .client
            .get(self.url(&format!("/v2/transcript/{job_id}")))
            .header(AUTHORIZATION, self.auth_header()?)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            return Err(TranscriptionError::Poll { status, message });
        }
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::types::JobStatus;

    fn backend(base_url: &str, key: Option<&str>) -> AssemblyAiBackend {
        AssemblyAiBackend::with_client(
            AssemblyAiConfig {
                api_key: key.map(String::from),
                base_url: base_url.to_string(),
                ..AssemblyAiConfig::default()
            },
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn upload_posts_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .and(header("authorization", "aai-key"))
            .and(body_string("RIFFdata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "upload_url": "https://cdn.example/abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let b = backend(&server.uri(), Some("aai-key"));
        let url = b.upload(reqwest::Body::from("RIFFdata")).await.unwrap();
        assert_eq!(url, "https://cdn.example/abc");
    }

    #[tokio::test]
    async fn upload_rejection_is_upload_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let b = backend(&server.uri(), Some("bad"));
        let err = b.upload(reqwest::Body::from("x")).await.unwrap_err();
        assert_matches!(err, TranscriptionError::Upload { status: 401, ref message } if message == "Invalid API key");
    }

    #[tokio::test]
    async fn create_job_sends_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .and(body_json(serde_json::json!({
                "audio_url": "https://cdn.example/abc",
                "speech_model": "universal"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "job-1", "status": "queued"})),
            )
            .mount(&server)
            .await;

        let b = backend(&server.uri(), Some("k"));
        assert_eq!(b.create_job("https://cdn.example/abc").await.unwrap(), "job-1");
    }

    #[tokio::test]
    async fn create_job_rejection_is_submit_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let b = backend(&server.uri(), Some("k"));
        let err = b.create_job("u").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to submit transcription: 500 - HTTP 500: oops");
    }

    #[tokio::test]
    async fn get_job_parses_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "job-1", "status": "completed", "text": "done", "confidence": 0.9
            })))
            .mount(&server)
            .await;

        let b = backend(&server.uri(), Some("k"));
        let snap = b.get_job("job-1").await.unwrap();
        assert_eq!(snap.status, JobStatus::Completed);
        assert_eq!(snap.text.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let b = backend("http://127.0.0.1:9", None);
        assert!(!b.is_configured());
        assert_matches!(
            b.create_job("u").await,
            Err(TranscriptionError::NotConfigured)
        );
    }
}
