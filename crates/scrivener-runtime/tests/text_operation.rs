//! Retry, degrade and fail paths of the text operation engine.

mod common;

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use scrivener_core::ManualClock;
use scrivener_core::logging::capture_logs;
use scrivener_core::text::ELLIPSIS;
use scrivener_llm::{GeminiBackend, GeminiConfig, ProviderSelector, RateLimiter};
use scrivener_runtime::operation::NOT_CONFIGURED;
use scrivener_runtime::{EnhancementKind, Operation, TextOperation};

use common::{ScriptedBackend, embedded_text, engine, internal_error, model_not_found, quota_exceeded};

#[tokio::test]
async fn success_trims_output_and_names_model() {
    let backend = ScriptedBackend::new(|_| Ok("  Hello there.\n".into()));
    let (ops, _clock) = engine(backend.clone());

    let r = ops.enhance("hello there", EnhancementKind::Structure).await;

    assert!(r.success());
    assert_eq!(r.output(), Some("Hello there."));
    assert_eq!(r.model(), Some("fake-1"));
    assert!(!r.fallback_used());
    assert_eq!(r.retries_used(), 0);
    assert_eq!(backend.prompts().len(), 1);
    assert!(backend.prompts()[0].starts_with("Fix punctuation, capitalization, and grammar"));
    assert_eq!(ops.health().snapshot()[0].model, "fake-1");
}

#[tokio::test]
async fn quota_errors_retry_twice_then_degrade() {
    let (logs, _guard) = capture_logs();
    let backend = ScriptedBackend::new(|_| Err(quota_exceeded()));
    let (ops, clock) = engine(backend.clone());

    let r = ops.enhance("hello world", EnhancementKind::Structure).await;

    assert!(r.success());
    assert!(r.fallback_used());
    assert_eq!(r.retries_used(), 2);
    assert_eq!(r.output(), Some("Hello world."));
    assert_eq!(backend.prompts().len(), 3);
    // Backoffs of 1 s and 2 s, with a 1 s rate-limit wait between them.
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(1), Duration::from_secs(2)]
    );
    assert_eq!(logs.count_matching("quota exceeded, retrying"), 2);
    assert!(logs.has_message("quota retries exhausted"));
}

#[tokio::test]
async fn quota_then_success_reports_retries() {
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let backend = ScriptedBackend::new(move |_| {
        if calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
            Err(quota_exceeded())
        } else {
            Ok("Resumen.".into())
        }
    });
    let (ops, _clock) = engine(backend);

    let r = ops.summarize("texto largo").await;
    assert!(r.success());
    assert!(!r.fallback_used());
    assert_eq!(r.retries_used(), 1);
    assert_eq!(r.output(), Some("Resumen."));
}

#[tokio::test]
async fn model_not_found_degrades_without_retry() {
    let backend = ScriptedBackend::new(|_| Err(model_not_found()));
    let (ops, clock) = engine(backend.clone());

    let r = ops.summarize("a short note").await;

    assert!(r.success());
    assert!(r.fallback_used());
    assert_eq!(r.retries_used(), 0);
    assert_eq!(r.output(), Some("a short note [AI summary not available]"));
    assert_eq!(r.error(), Some("AI model not available for summary"));
    assert_eq!(backend.prompts().len(), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn unclassified_error_fails_without_output() {
    let backend = ScriptedBackend::new(|_| Err(internal_error()));
    let (ops, _clock) = engine(backend.clone());

    let r = ops.translate("hola", "French").await;

    assert!(!r.success());
    assert_eq!(r.output(), None);
    assert!(!r.fallback_used());
    assert_eq!(r.error(), Some("API error (500): Internal error encountered."));
    assert_eq!(r.original_text(), "hola");
    assert_eq!(backend.prompts().len(), 1);
}

#[tokio::test]
async fn unreachable_provider_error_keeps_the_key_private() {
    let (logs, _guard) = capture_logs();
    let backend = GeminiBackend::new(GeminiConfig {
        api_key: Some("SUPERSECRET123".into()),
        base_url: "http://127.0.0.1:9".into(),
        ..GeminiConfig::default()
    })
    .unwrap();
    let (_clock, shared) = ManualClock::shared();
    let limiter = Arc::new(RateLimiter::new(Duration::from_secs(2), Arc::clone(&shared)));
    let ops = TextOperation::new(ProviderSelector::new(Arc::new(backend)), limiter, shared);

    let r = ops.translate("hola", "French").await;

    assert!(!r.success());
    let error = r.error().unwrap();
    assert!(error.starts_with("HTTP error:"), "{error}");
    assert!(!error.contains("SUPERSECRET123"), "{error}");
    for event in logs.events() {
        assert!(!event.message.contains("SUPERSECRET123"));
        assert!(event.fields.iter().all(|(_, v)| !v.contains("SUPERSECRET123")));
    }
}

#[tokio::test]
async fn unconfigured_short_circuits() {
    let backend = ScriptedBackend::unconfigured();
    let (ops, _clock) = engine(backend.clone());

    for op in [
        Operation::Enhance { kind: EnhancementKind::Expressions },
        Operation::Translate { target_language: "English".into() },
        Operation::Summarize,
    ] {
        let r = ops.run(&op, "some text").await;
        assert!(!r.success());
        assert_eq!(r.error(), Some(NOT_CONFIGURED));
        assert_eq!(r.original_text(), "some text");
        assert_eq!(r.output(), None);
    }
    assert!(backend.prompts().is_empty());
}

#[tokio::test]
async fn noop_languages_skip_provider() {
    let backend = ScriptedBackend::new(|_| Ok("should not be called".into()));
    let (ops, clock) = engine(backend.clone());

    for lang in ["english", "ENGLISH", "En", "auto", "Original"] {
        let r = ops.translate("hello", lang).await;
        assert!(r.success());
        assert!(r.skipped());
        assert_eq!(r.output(), Some("hello"));
    }
    assert!(backend.prompts().is_empty());
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn translation_degrades_with_marker() {
    let backend = ScriptedBackend::new(|_| Err(model_not_found()));
    let (ops, _clock) = engine(backend);

    let r = ops.translate("hola amigos", "German").await;
    assert!(r.success() && r.fallback_used());
    assert_eq!(r.output(), Some("hola amigos [Translation to German not available]"));
}

#[tokio::test]
async fn truncation_is_logged_with_cap() {
    let (logs, _guard) = capture_logs();
    let backend = ScriptedBackend::new(|_| Ok("ok".into()));
    let (ops, _clock) = engine(backend.clone());

    let text = "x".repeat(2500);
    let r = ops.enhance(&text, EnhancementKind::Readability).await;

    let sent = embedded_text(&backend.prompts()[0]).to_string();
    assert_eq!(sent.chars().count(), 2000 + ELLIPSIS.len());
    assert_eq!(r.original_text(), sent);
    let event = logs.find("input truncated").unwrap();
    assert_eq!(event.field("cap"), Some("2000"));
}

#[tokio::test]
async fn calls_are_spaced_by_the_limiter() {
    let backend = ScriptedBackend::new(|_| Ok("ok".into()));
    let (ops, clock) = engine(backend);

    let _ = ops.summarize("one").await;
    let _ = ops.summarize("two").await;
    let _ = ops.summarize("three").await;

    assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 2]);
}

#[tokio::test]
async fn scenario_structure_with_provider_unavailable() {
    let backend = ScriptedBackend::new(|_| Err(model_not_found()));
    let (ops, _clock) = engine(backend);

    let r = ops
        .enhance("hello world this is a test", EnhancementKind::Structure)
        .await;
    let out = r.output().unwrap();
    assert!(out.starts_with("Hello"));
    assert!(out.ends_with('.'));
    assert_eq!(r.error(), Some("AI model not available, using basic enhancement"));
}

#[tokio::test]
async fn scenario_expressions_with_provider_unavailable() {
    let backend = ScriptedBackend::new(|_| Err(model_not_found()));
    let (ops, _clock) = engine(backend);

    let r = ops
        .enhance("I am so happy today", EnhancementKind::Expressions)
        .await;
    assert!(r.output().unwrap().ends_with(" (positive tone)"));
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn provider_sees_exactly_cap_plus_ellipsis(extra in 1usize..400, letter in "[a-zé]") {
        let backend = ScriptedBackend::new(|_| Ok("ok".into()));
        let (ops, _clock) = engine(backend.clone());
        let text = letter.repeat(1500 + extra);

        let _ = block_on(ops.summarize(&text));

        let prompts = backend.prompts();
        let sent = embedded_text(&prompts[0]);
        prop_assert_eq!(sent.chars().count(), 1500 + ELLIPSIS.len());
        prop_assert!(sent.ends_with(ELLIPSIS));
        prop_assert_eq!(&sent[..sent.len() - ELLIPSIS.len()], letter.repeat(1500));
    }

    #[test]
    fn noop_language_in_any_case_is_skipped(
        lang in prop::sample::select(vec!["english", "en", "auto", "original"]),
        upper in prop::collection::vec(any::<bool>(), 8),
    ) {
        let mixed: String = lang
            .chars()
            .zip(upper.iter().cycle())
            .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
            .collect();
        let backend = ScriptedBackend::new(|_| Ok("nope".into()));
        let (ops, _clock) = engine(backend.clone());

        let r = block_on(ops.translate("unchanged", &mixed));

        prop_assert!(r.skipped());
        prop_assert_eq!(r.output(), Some("unchanged"));
        prop_assert!(backend.prompts().is_empty());
    }
}
