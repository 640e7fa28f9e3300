//! Provider-free text heuristics used when generation degrades.
//!
//! Everything here is pure and total: any string, including `""`, yields a
//! string.

use std::sync::LazyLock;

use regex::Regex;
use scrivener_core::text::{capitalize_first, word_count};
use serde::{Deserialize, Serialize};

/// Words kept by [`excerpt`] before the marker.
pub const EXCERPT_WORDS: usize = 50;

/// Marker appended to a truncated excerpt when the model is unavailable.
pub const UNAVAILABLE_EXCERPT_MARKER: &str = "[AI summary not available, showing excerpt]";
/// Marker appended to short text when the model is unavailable.
pub const UNAVAILABLE_MARKER: &str = "[AI summary not available]";
/// Marker appended when quota retries are exhausted.
pub const QUOTA_MARKER: &str = "[Summary generation failed due to API limits]";

const POSITIVE_WORDS: &[&str] = &["good", "great", "excellent", "amazing", "happy"];
const NEGATIVE_WORDS: &[&str] = &["bad", "terrible", "awful", "problem", "sad"];

/// A lower-case letter, whitespace, then an upper-case letter: a likely
/// missing sentence break.
static MISSING_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])\s+([A-Z])").expect("valid sentence break regex"));

/// Enhancement requested from the provider (and mirrored by the fallback).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementKind {
    /// Punctuation, capitalization and grammar.
    #[default]
    Structure,
    /// Emotion and tone.
    Expressions,
    /// Anything else: general readability.
    Readability,
}

impl EnhancementKind {
    /// Map a caller-supplied name; unknown names become [`Self::Readability`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "structure" => Self::Structure,
            "expressions" => Self::Expressions,
            _ => Self::Readability,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Expressions => "expressions",
            Self::Readability => "readability",
        }
    }
}

/// Local stand-in for an enhancement the provider could not perform.
pub fn basic_text_enhancement(text: &str, kind: EnhancementKind) -> String {
    match kind {
        EnhancementKind::Structure => structure(text),
        EnhancementKind::Expressions => expressions(text),
        EnhancementKind::Readability => {
            excerpt(text, UNAVAILABLE_EXCERPT_MARKER, UNAVAILABLE_MARKER)
        }
    }
}

/// First [`EXCERPT_WORDS`] words followed by `excerpt_marker` when the text
/// is longer than that, else the text followed by `full_marker`.
pub fn excerpt(text: &str, excerpt_marker: &str, full_marker: &str) -> String {
    if word_count(text) > EXCERPT_WORDS {
        let head: Vec<&str> = text.split_whitespace().take(EXCERPT_WORDS).collect();
        format!("{}... {excerpt_marker}", head.join(" "))
    } else {
        format!("{text} {full_marker}")
    }
}

fn structure(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let broken = MISSING_BREAK.replace_all(trimmed, "$1. $2");
    let mut out = capitalize_first(&broken);
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

fn expressions(text: &str) -> String {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    let has_any = |set: &[&str]| set.iter().any(|word| lower.contains(word));
    if has_any(POSITIVE_WORDS) {
        format!("{trimmed} (positive tone)")
    } else if has_any(NEGATIVE_WORDS) {
        format!("{trimmed} (concerned tone)")
    } else {
        trimmed.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
