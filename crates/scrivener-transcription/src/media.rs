//! Uploaded media checks: extension allow-list and filename sanitizing.

/// Media extensions accepted when no explicit list is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &["mp3", "wav", "m4a", "mp4", "avi", "mov", "webm", "ogg", "flac"];

/// Lower-cased extension after the last dot, if any.
pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Whether `filename` carries one of the `allowed` extensions
/// (case-insensitive).
pub fn is_allowed(filename: &str, allowed: &[String]) -> bool {
    extension(filename).is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Path components are dropped and every character outside
/// `[A-Za-z0-9._-]` becomes `_`. Leading dots are stripped so the result
/// is never hidden or a relative path. Returns `"upload"` when nothing is
/// left.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Suffix for a temporary file holding `filename` (e.g. `"_talk.mp3"`).
pub fn temp_suffix(filename: &str) -> String {
    format!("_{}", sanitize_filename(filename))
}
