//! Speech-to-text and pipeline settings.

use serde::{Deserialize, Serialize};

/// Settings for the speech-to-text provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionSettings {
    /// Provider credential.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// REST base URL of the provider.
    pub base_url: String,
    /// Speech model requested for each job.
    pub speech_model: String,
    /// Delay between job status reads in milliseconds.
    pub poll_interval_ms: u64,
    /// Optional upper bound on total polling time. `None` polls until a
    /// terminal state is observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_poll_duration_ms: Option<u64>,
    /// Accepted media file extensions (lower-case, no dot).
    pub allowed_extensions: Vec<String>,
}

impl TranscriptionSettings {
    /// Whether a non-empty credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.assemblyai.com".to_string(),
            speech_model: "universal".to_string(),
            poll_interval_ms: 3000,
            max_poll_duration_ms: None,
            allowed_extensions: ["mp3", "wav", "m4a", "mp4", "avi", "mov", "webm", "ogg", "flac"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Settings for the post-transcription pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// Pause between consecutive enhancement stages in milliseconds.
    pub stage_pause_ms: u64,
    /// Target language assumed when a request names none.
    pub default_target_language: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stage_pause_ms: 1000,
            default_target_language: "English".to_string(),
        }
    }
}
