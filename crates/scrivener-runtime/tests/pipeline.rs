//! Stage sequencing and partial-failure tolerance of the pipeline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use scrivener_core::{ManualClock, SharedClock};
use scrivener_runtime::{Pipeline, Stage};

use common::{ScriptedBackend, engine, internal_error, model_not_found};

fn pipeline(backend: Arc<ScriptedBackend>) -> (Pipeline, Arc<ManualClock>) {
    let (ops, clock) = engine(backend);
    let shared: SharedClock = clock.clone();
    (Pipeline::new(ops, shared), clock)
}

#[tokio::test]
async fn translation_failure_does_not_stop_enhancement() {
    let backend = ScriptedBackend::new(|prompt| {
        if prompt.starts_with("Translate") {
            Err(internal_error())
        } else if prompt.starts_with("Fix punctuation") {
            Ok("Bonjour tout le monde.".into())
        } else {
            Ok("fine".into())
        }
    });
    let (pipeline, _clock) = pipeline(backend.clone());

    let result = pipeline.run("bonjour tout le monde", "Spanish", true).await;
    let fields = result.fields();

    assert_eq!(fields["success"], true);
    assert_eq!(
        fields["translation_error"],
        "API error (500): Internal error encountered."
    );
    assert_eq!(fields["structured_text"], "Bonjour tout le monde.");
    assert_eq!(fields["expressive_text"], "fine");
    assert_eq!(fields["summary"], "fine");
    // Enhancement ran over the untranslated transcript.
    assert!(backend.prompts()[1].ends_with("\n\nbonjour tout le monde"));
}

#[tokio::test]
async fn stages_use_translated_text() {
    let backend = ScriptedBackend::new(|prompt| {
        if prompt.starts_with("Translate") {
            Ok("hola mundo".into())
        } else {
            Ok("ok".into())
        }
    });
    let (pipeline, _clock) = pipeline(backend.clone());

    let result = pipeline.run("hello world", "Spanish", true).await;

    assert_eq!(result.stage(Stage::Translation).unwrap().output(), Some("hola mundo"));
    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[1..].iter().all(|p| p.ends_with("\n\nhola mundo")));
    let fields = result.fields();
    assert_eq!(fields["translated_text"], "hola mundo");
    assert_eq!(fields["target_language"], "Spanish");
}

#[tokio::test]
async fn noop_language_runs_no_translation_even_unconfigured() {
    let backend = ScriptedBackend::unconfigured();
    let (pipeline, _clock) = pipeline(backend);

    let result = pipeline.run("hello", "English", false).await;

    assert!(result.stage(Stage::Translation).unwrap().skipped());
    assert_eq!(result.stages.len(), 1);
    let fields = result.fields();
    assert_eq!(fields["translation_skipped"], true);
    assert!(fields.get("translation_error").is_none());
}

#[tokio::test]
async fn unconfigured_provider_records_errors_per_stage() {
    let backend = ScriptedBackend::unconfigured();
    let (pipeline, _clock) = pipeline(backend);

    let fields = pipeline.run("hello", "French", true).await.fields();

    for field in [
        "translation_error",
        "structure_error",
        "expressions_error",
        "summary_error",
    ] {
        assert_eq!(fields[field], "Gemini API key not configured", "{field}");
    }
}

#[tokio::test]
async fn degraded_stages_are_flagged() {
    let backend = ScriptedBackend::new(|_| Err(model_not_found()));
    let (pipeline, _clock) = pipeline(backend);

    let fields = pipeline.run("we had a great day", "auto", true).await.fields();

    assert_eq!(fields["structured_text"], "We had a great day.");
    assert_eq!(fields["structure_fallback"], true);
    assert_eq!(fields["expressive_text"], "we had a great day (positive tone)");
    assert_eq!(fields["expressions_fallback"], true);
    assert_eq!(fields["summary"], "we had a great day [AI summary not available]");
    assert_eq!(fields["summary_fallback"], true);
    assert_eq!(fields["translation_skipped"], true);
}

#[tokio::test]
async fn enhancement_stages_are_paced() {
    let backend = ScriptedBackend::new(|_| Ok("ok".into()));
    let (pipeline, clock) = pipeline(backend);

    let _ = pipeline.run("text", "English", true).await;

    // 1 s stage pause, then the limiter tops it up to its 2 s spacing.
    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(1),
            Duration::from_secs(1),
            Duration::from_secs(1),
        ]
    );
}

#[tokio::test]
async fn zero_pause_leaves_only_rate_limiting() {
    let backend = ScriptedBackend::new(|_| Ok("ok".into()));
    let (pipeline, clock) = pipeline(backend);

    let _ = pipeline
        .with_stage_pause(Duration::ZERO)
        .run("text", "English", true)
        .await;

    assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 2]);
}
