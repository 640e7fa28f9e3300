//! Speech-to-text provider seam.

use async_trait::async_trait;

use crate::types::{JobSnapshot, TranscriptionError};

/// Speech-to-text provider operations used by [`TranscriptionClient`].
///
/// [`TranscriptionClient`]: crate::TranscriptionClient
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Provider identifier (e.g. `"assemblyai"`).
    fn name(&self) -> &str;

    /// Whether a credential is available.
    fn is_configured(&self) -> bool;

    /// Upload raw media, returning the provider URL that references it.
    async fn upload(&self, media: reqwest::Body) -> Result<String, TranscriptionError>;

    /// Request transcription of uploaded media, returning the job id.
    async fn create_job(&self, audio_url: &str) -> Result<String, TranscriptionError>;

    /// Read the current state of a job.
    async fn get_job(&self, job_id: &str) -> Result<JobSnapshot, TranscriptionError>;
}
