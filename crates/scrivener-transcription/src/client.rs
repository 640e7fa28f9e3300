//! Submit/poll state machine over a [`SpeechToText`] backend.
//!
//! `Submitted → Polling → {Completed | Failed}`. Upload, submit and status
//! read failures end the job immediately; there is no retry. Polling is
//! unbounded unless [`PollSettings::max_duration`] is set.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use scrivener_core::SharedClock;
use tracing::{debug, error, info, instrument};

use crate::backend::SpeechToText;
use crate::types::{JobStatus, TranscriptionError, TranscriptionJob};

/// Default delay between status reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Polling cadence and optional bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between status reads.
    pub interval: Duration,
    /// Give up after this much polling. `None` polls until a terminal state.
    pub max_duration: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_duration: None,
        }
    }
}

/// Drives one media file through upload, job creation and polling.
#[derive(Clone)]
pub struct TranscriptionClient {
    backend: Arc<dyn SpeechToText>,
    clock: SharedClock,
    poll: PollSettings,
}

impl TranscriptionClient {
    /// Create a client.
    pub fn new(backend: Arc<dyn SpeechToText>, clock: SharedClock, poll: PollSettings) -> Self {
        Self {
            backend,
            clock,
            poll,
        }
    }

    /// Whether the backend has a credential.
    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    /// Backend identifier.
    pub fn provider_name(&self) -> &str {
        self.backend.name()
    }

    /// Upload in-memory media, returning the provider URL.
    pub async fn submit(&self, media: Bytes) -> Result<String, TranscriptionError> {
        info!(bytes = media.len(), provider = self.backend.name(), "uploading media");
        self.upload(reqwest::Body::from(media)).await
    }

    /// Stream a media file from disk to the provider, returning its URL.
    ///
    /// The file is only read; the caller keeps ownership and removes it.
    pub async fn submit_file(&self, path: &Path) -> Result<String, TranscriptionError> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        info!(bytes = len, provider = self.backend.name(), "uploading media file");
        self.upload(reqwest::Body::from(file)).await
    }

    async fn upload(&self, body: reqwest::Body) -> Result<String, TranscriptionError> {
        match self.backend.upload(body).await {
            Ok(url) => {
                debug!(upload_url = %url, "media uploaded");
                Ok(url)
            }
            Err(e) => {
                error!(error = %e, "media upload failed");
                record_outcome("upload_failed");
                Err(e)
            }
        }
    }

    /// Create a job for `audio_url` and poll it to a terminal state.
    ///
    /// A failed job is returned as [`TranscriptionError::JobFailed`].
    #[instrument(skip_all)]
    pub async fn transcribe(&self, audio_url: &str) -> Result<TranscriptionJob, TranscriptionError> {
        let job_id = self.backend.create_job(audio_url).await.inspect_err(|e| {
            error!(error = %e, "transcription submit failed");
            record_outcome("submit_failed");
        })?;
        info!(job_id = %job_id, "transcription job created");

        let started = self.clock.now();
        let mut polls: u32 = 0;
        loop {
            let snapshot = self.backend.get_job(&job_id).await.inspect_err(|e| {
                error!(job_id = %job_id, error = %e, "transcription status read failed");
                record_outcome("poll_failed");
            })?;
            polls += 1;
            debug!(job_id = %job_id, status = ?snapshot.status, polls, "polled transcription job");

            match snapshot.status {
                JobStatus::Completed => {
                    info!(job_id = %job_id, polls, "transcription completed");
                    record_outcome("completed");
                    return Ok(TranscriptionJob {
                        audio_url: audio_url.to_string(),
                        job_id,
                        status: JobStatus::Completed,
                        transcript: snapshot.text,
                        confidence: snapshot.confidence,
                        words: snapshot.words.unwrap_or_default(),
                        error: None,
                        polls,
                    });
                }
                JobStatus::Failed => {
                    let message = snapshot
                        .error
                        .unwrap_or_else(|| "unknown provider error".to_string());
                    error!(job_id = %job_id, error = %message, "transcription failed");
                    record_outcome("failed");
                    return Err(TranscriptionError::JobFailed { job_id, message });
                }
                JobStatus::Queued | JobStatus::Processing => {}
            }

            if let Some(max) = self.poll.max_duration {
                let elapsed = self.clock.now().saturating_duration_since(started);
                if elapsed >= max {
                    error!(job_id = %job_id, polls, "transcription polling timed out");
                    record_outcome("timeout");
                    return Err(TranscriptionError::PollTimeout {
                        job_id,
                        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    });
                }
            }
            self.clock.sleep(self.poll.interval).await;
        }
    }
}

impl std::fmt::Debug for TranscriptionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionClient")
            .field("backend", &self.backend.name())
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("transcriptions_total", "outcome" => outcome).increment(1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
