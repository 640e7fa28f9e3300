//! Post-transcription pipeline.
//!
//! Translation (recorded as skipped when the target is a no-op language),
//! then, when asked for, structure → expressions → summary over the
//! translated text. Stages run one after another with a pause between
//! enhancement calls; no stage failure stops the ones after it.

mod result;

use std::collections::BTreeMap;
use std::time::Duration;

use scrivener_core::SharedClock;
use tracing::{debug, info, instrument};

pub use result::{PipelineResult, Stage};

use crate::fallback::EnhancementKind;
use crate::operation::{TextOperation, TextOperationResult, is_noop_language};

/// Default pause between enhancement stages.
pub const DEFAULT_STAGE_PAUSE: Duration = Duration::from_secs(1);

/// Runs the stage sequence over one transcript.
#[derive(Clone, Debug)]
pub struct Pipeline {
    ops: TextOperation,
    clock: SharedClock,
    stage_pause: Duration,
}

impl Pipeline {
    /// Create a pipeline with the default inter-stage pause.
    pub fn new(ops: TextOperation, clock: SharedClock) -> Self {
        Self {
            ops,
            clock,
            stage_pause: DEFAULT_STAGE_PAUSE,
        }
    }

    /// Same pipeline with a different pause between enhancement stages.
    #[must_use]
    pub fn with_stage_pause(&self, stage_pause: Duration) -> Self {
        Self {
            stage_pause,
            ..self.clone()
        }
    }

    /// The operation engine stages run on.
    pub fn operations(&self) -> &TextOperation {
        &self.ops
    }

    /// Run every applicable stage over `transcript`.
    #[instrument(skip_all, fields(target_language = %target_language, enhance = want_enhancement))]
    pub async fn run(
        &self,
        transcript: &str,
        target_language: &str,
        want_enhancement: bool,
    ) -> PipelineResult {
        let mut stages = BTreeMap::new();
        let mut attempted_language = None;

        if target_language.trim().is_empty() || is_noop_language(target_language) {
            debug!("translation not requested");
            let _ = stages.insert(Stage::Translation, TextOperationResult::passthrough(transcript));
        } else {
            let translation = self.ops.translate(transcript, target_language).await;
            info!(success = translation.success(), fallback = translation.fallback_used(), "translation stage done");
            attempted_language = Some(target_language.to_string());
            let _ = stages.insert(Stage::Translation, translation);
        }

        let mut result = PipelineResult {
            transcript: transcript.to_string(),
            target_language: attempted_language,
            stages,
        };
        if !want_enhancement {
            return result;
        }

        let text = result.working_text().to_string();
        for (i, stage) in [Stage::Structure, Stage::Expressions, Stage::Summary]
            .into_iter()
            .enumerate()
        {
            if i > 0 && !self.stage_pause.is_zero() {
                self.clock.sleep(self.stage_pause).await;
            }
            let outcome = match stage {
                Stage::Structure => self.ops.enhance(&text, EnhancementKind::Structure).await,
                Stage::Expressions => self.ops.enhance(&text, EnhancementKind::Expressions).await,
                _ => self.ops.summarize(&text).await,
            };
            info!(
                stage = stage.as_str(),
                success = outcome.success(),
                fallback = outcome.fallback_used(),
                "pipeline stage done"
            );
            let _ = result.stages.insert(stage, outcome);
        }
        result
    }
}
