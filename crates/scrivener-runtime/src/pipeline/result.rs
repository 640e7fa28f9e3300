//! Aggregated outcome of a pipeline run.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::operation::TextOperationResult;

/// Post-transcription stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Translation into the requested language.
    Translation,
    /// Punctuation and grammar.
    Structure,
    /// Tone annotation.
    Expressions,
    /// Short summary.
    Summary,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Self; 4] = [
        Self::Translation,
        Self::Structure,
        Self::Expressions,
        Self::Summary,
    ];

    /// Stage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translation => "translation",
            Self::Structure => "structure",
            Self::Expressions => "expressions",
            Self::Summary => "summary",
        }
    }

    /// Response field carrying this stage's output.
    fn output_field(self) -> &'static str {
        match self {
            Self::Translation => "translated_text",
            Self::Structure => "structured_text",
            Self::Expressions => "expressive_text",
            Self::Summary => "summary",
        }
    }

    /// Prefix of the `_fallback` / `_error` fields.
    fn field_prefix(self) -> &'static str {
        match self {
            Self::Translation => "translation",
            Self::Structure => "structure",
            Self::Expressions => "expressions",
            Self::Summary => "summary",
        }
    }
}

/// Transcript plus every stage that ran.
///
/// Stages that did not run are absent. A failed stage is still present,
/// carrying its error. The run as a whole is always successful: the
/// transcript is the minimum output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineResult {
    /// Input transcript, unmodified.
    pub transcript: String,
    /// Language translation was requested into, when it was attempted.
    pub target_language: Option<String>,
    /// Outcome per stage.
    pub stages: BTreeMap<Stage, TextOperationResult>,
}

impl PipelineResult {
    /// Outcome of `stage`, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<&TextOperationResult> {
        self.stages.get(&stage)
    }

    /// Text downstream stages worked on: the translation when it succeeded,
    /// else the transcript.
    pub fn working_text(&self) -> &str {
        self.stage(Stage::Translation)
            .filter(|r| r.success() && !r.skipped())
            .and_then(TextOperationResult::output)
            .unwrap_or(&self.transcript)
    }

    /// Flat response fields (`translated_text`, `structure_fallback`,
    /// `summary_error`, ...).
    ///
    /// Per stage: output under the stage's text field when it succeeded,
    /// `<stage>_fallback` when the output is degraded, `<stage>_error` when
    /// it failed. A skipped translation sets `translation_skipped`.
    pub fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        let _ = fields.insert("success".into(), Value::Bool(true));
        for stage in Stage::ALL {
            let Some(result) = self.stage(stage) else {
                continue;
            };
            let prefix = stage.field_prefix();
            if stage == Stage::Translation {
                if result.skipped() {
                    let _ = fields.insert("translation_skipped".into(), Value::Bool(true));
                    continue;
                }
                if let Some(lang) = &self.target_language {
                    let _ = fields.insert("target_language".into(), Value::String(lang.clone()));
                }
            }
            match result.output() {
                Some(output) => {
                    let _ = fields.insert(
                        stage.output_field().into(),
                        Value::String(output.to_string()),
                    );
                    if result.fallback_used() {
                        let _ = fields.insert(format!("{prefix}_fallback"), Value::Bool(true));
                    }
                }
                None => {
                    let message = result.error().unwrap_or("unknown error").to_string();
                    let _ = fields.insert(format!("{prefix}_error"), Value::String(message));
                }
            }
        }
        fields
    }
}

impl Serialize for PipelineResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields().serialize(serializer)
    }
}
