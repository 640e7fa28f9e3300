//! Settings types, grouped by the service area they configure.

mod generation;
mod server;
mod transcription;

pub use generation::{GenerationSettings, TruncationCaps};
pub use server::ServerSettings;
pub use transcription::{PipelineSettings, TranscriptionSettings};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrivenerSettings {
    /// HTTP listener and logging.
    pub server: ServerSettings,
    /// Generative-text provider (enhance / translate / summarize).
    pub generation: GenerationSettings,
    /// Speech-to-text provider.
    pub transcription: TranscriptionSettings,
    /// Post-transcription pipeline pacing.
    pub pipeline: PipelineSettings,
}

impl ScrivenerSettings {
    /// Reject combinations that would make the service misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.generation.default_model.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "generation.defaultModel must not be empty".into(),
            ));
        }
        let caps = &self.generation.caps;
        if caps.enhance == 0 || caps.translate == 0 || caps.summarize == 0 {
            return Err(SettingsError::InvalidValue(
                "generation.caps values must be positive".into(),
            ));
        }
        if self.transcription.poll_interval_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "transcription.pollIntervalMs must be positive".into(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(SettingsError::InvalidValue(
                "server.maxUploadBytes must be positive".into(),
            ));
        }
        Ok(())
    }
}
