//! Character-safe text helpers.

use std::borrow::Cow;

/// Marker appended to text that was cut at a length cap.
pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `cap` characters, appending [`ELLIPSIS`] when cut.
///
/// Counts Unicode scalar values, never bytes, so multi-byte input is never
/// split inside a character. Returns `Cow::Borrowed` when no cut was needed.
pub fn truncate_with_ellipsis(text: &str, cap: usize) -> Cow<'_, str> {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + ELLIPSIS.len());
            out.push_str(&text[..byte_idx]);
            out.push_str(ELLIPSIS);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Upper-case the first character, leaving the rest untouched.
///
/// Total over all input, including the empty string.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
