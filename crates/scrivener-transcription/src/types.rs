//! Core types for transcription jobs.

use serde::{Deserialize, Serialize};

/// Provider-side job state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, not started.
    Queued,
    /// Being transcribed.
    Processing,
    /// Finished with a transcript.
    Completed,
    /// Finished with an error.
    #[serde(rename = "error", alias = "failed")]
    Failed,
}

impl JobStatus {
    /// Whether no further transitions can happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Word-level timing from a completed job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The word as transcribed.
    pub text: String,
    /// Start offset in milliseconds.
    pub start: u64,
    /// End offset in milliseconds.
    pub end: u64,
    /// Recognition confidence (0.0–1.0).
    #[serde(default)]
    pub confidence: f64,
}

/// One status read of a job, as returned by the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Provider job identifier.
    pub id: String,
    /// Current status.
    pub status: JobStatus,
    /// Transcript text (completed jobs).
    #[serde(default)]
    pub text: Option<String>,
    /// Overall confidence (completed jobs).
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Word-level data (completed jobs).
    #[serde(default)]
    pub words: Option<Vec<Word>>,
    /// Failure description (failed jobs).
    #[serde(default)]
    pub error: Option<String>,
}

/// A transcription job that reached a terminal state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranscriptionJob {
    /// URL of the uploaded media.
    pub audio_url: String,
    /// Provider job identifier.
    pub job_id: String,
    /// Terminal status.
    pub status: JobStatus,
    /// Transcript text.
    pub transcript: Option<String>,
    /// Overall confidence.
    pub confidence: Option<f64>,
    /// Word-level data.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<Word>,
    /// Failure description.
    pub error: Option<String>,
    /// Number of status reads performed.
    pub polls: u32,
}

impl TranscriptionJob {
    /// Transcript text, empty when the provider returned none.
    pub fn transcript_text(&self) -> &str {
        self.transcript.as_deref().unwrap_or_default()
    }
}

/// Errors that can occur during transcription.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    /// No provider credential is configured.
    #[error("speech-to-text provider not configured")]
    NotConfigured,

    /// The provider rejected the media upload.
    #[error("Failed to upload file: {status} - {message}")]
    Upload {
        /// HTTP status code.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// The provider rejected the transcription request.
    #[error("Failed to submit transcription: {status} - {message}")]
    Submit {
        /// HTTP status code.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// A status read failed.
    #[error("Failed to read transcription status: {status} - {message}")]
    Poll {
        /// HTTP status code.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// The job reached the failed state.
    #[error("Transcription failed: {message}")]
    JobFailed {
        /// Provider job identifier.
        job_id: String,
        /// Provider error message.
        message: String,
    },

    /// The optional polling bound elapsed before a terminal state.
    #[error("Transcription did not finish within {elapsed_ms}ms (job {job_id})")]
    PollTimeout {
        /// Provider job identifier.
        job_id: String,
        /// Time spent polling.
        elapsed_ms: u64,
    },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading local media failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
