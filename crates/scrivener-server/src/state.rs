//! Shared handler state and its construction from settings.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusHandle;
use scrivener_core::{SharedClock, TokioClock};
use scrivener_llm::{GeminiBackend, GeminiConfig, ProviderSelector, RateLimiter};
use scrivener_runtime::{Pipeline, TextOperation};
use scrivener_settings::ScrivenerSettings;
use scrivener_transcription::{
    AssemblyAiBackend, AssemblyAiConfig, PollSettings, TranscriptionClient,
};
use tracing::info;

use crate::error::ServerError;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Speech-to-text client.
    pub transcription: TranscriptionClient,
    /// Post-transcription pipeline (and, through it, the text operations).
    pub pipeline: Pipeline,
    /// Effective settings.
    pub settings: Arc<ScrivenerSettings>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Assemble state from already-built components.
    pub fn new(
        settings: ScrivenerSettings,
        transcription: TranscriptionClient,
        pipeline: Pipeline,
    ) -> Self {
        Self {
            transcription,
            pipeline,
            settings: Arc::new(settings),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Build the Gemini and AssemblyAI backends described by `settings`.
    pub fn from_settings(settings: ScrivenerSettings) -> Result<Self, ServerError> {
        Self::from_settings_with_clock(settings, TokioClock::shared())
    }

    /// Same as [`Self::from_settings`] with an explicit clock.
    pub fn from_settings_with_clock(
        settings: ScrivenerSettings,
        clock: SharedClock,
    ) -> Result<Self, ServerError> {
        let generation = &settings.generation;
        let gemini = GeminiBackend::new(GeminiConfig {
            api_key: generation.api_key.clone(),
            base_url: generation.base_url.clone(),
            models: generation.models.clone(),
            default_model: generation.default_model.clone(),
            request_timeout: Duration::from_millis(generation.request_timeout_ms),
        })?;
        let limiter = Arc::new(RateLimiter::new(
            Duration::from_millis(generation.min_call_interval_ms),
            Arc::clone(&clock),
        ));
        let ops = TextOperation::new(
            ProviderSelector::new(Arc::new(gemini)),
            limiter,
            Arc::clone(&clock),
        )
        .with_caps(generation.caps)
        .with_retry(generation.retry.clone());
        let pipeline = Pipeline::new(ops, Arc::clone(&clock))
            .with_stage_pause(Duration::from_millis(settings.pipeline.stage_pause_ms));

        let stt = &settings.transcription;
        let assemblyai = AssemblyAiBackend::new(AssemblyAiConfig {
            api_key: stt.api_key.clone(),
            base_url: stt.base_url.clone(),
            speech_model: stt.speech_model.clone(),
            ..AssemblyAiConfig::default()
        })?;
        let poll = PollSettings {
            interval: Duration::from_millis(stt.poll_interval_ms),
            max_duration: stt.max_poll_duration_ms.map(Duration::from_millis),
        };
        let transcription = TranscriptionClient::new(Arc::new(assemblyai), clock, poll);

        info!(
            generation_configured = generation.is_configured(),
            transcription_configured = stt.is_configured(),
            "providers initialized"
        );
        Ok(Self::new(settings, transcription, pipeline))
    }

    /// Attach the Prometheus handle rendered at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Text operation engine.
    pub fn operations(&self) -> &TextOperation {
        self.pipeline.operations()
    }
}
