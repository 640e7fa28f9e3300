//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ScrivenerSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use scrivener_core::logging::LogFormat;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::ScrivenerSettings;

/// Resolve the path to the settings file (`~/.scrivener/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".scrivener").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ScrivenerSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or a value that fails
/// validation is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ScrivenerSettings> {
    let defaults = serde_json::to_value(ScrivenerSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ScrivenerSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply process environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut ScrivenerSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Empty values are ignored. Numbers outside their accepted range and
/// unparseable values are logged and ignored.
pub fn apply_overrides_from(settings: &mut ScrivenerSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    // ── Credentials ─────────────────────────────────────────────────
    if let Some(v) = read("GEMINI_API_KEY") {
        settings.generation.api_key = Some(v);
    }
    if let Some(v) = read("ASSEMBLYAI_API_KEY").or_else(|| read("API_KEY")) {
        settings.transcription.api_key = Some(v);
    }
    if let Some(v) = read("ASSEMBLYAI_BASE") {
        settings.transcription.base_url = v;
    }

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read("SCRIVENER_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_in_range::<u16>(&read, "SCRIVENER_PORT", 0, u16::MAX) {
        settings.server.port = v;
    }
    if let Some(v) = read("SCRIVENER_LOG_LEVEL") {
        settings.server.log_level = v;
    }
    if let Some(v) = read("SCRIVENER_LOG_FORMAT") {
        match parse_log_format(&v) {
            Some(format) => settings.server.log_format = format,
            None => warn!(key = "SCRIVENER_LOG_FORMAT", value = %v, "invalid log format, ignoring"),
        }
    }
    if let Some(v) =
        read_in_range::<usize>(&read, "SCRIVENER_MAX_UPLOAD_BYTES", 1024, 1_073_741_824)
    {
        settings.server.max_upload_bytes = v;
    }
    if let Some(v) = read("SCRIVENER_CORS_ALLOW_ALL") {
        match parse_bool(&v) {
            Some(b) => settings.server.cors_allow_all = b,
            None => warn!(key = "SCRIVENER_CORS_ALLOW_ALL", value = %v, "invalid boolean env var, ignoring"),
        }
    }

    // ── Generation ──────────────────────────────────────────────────
    if let Some(v) = read("SCRIVENER_GEMINI_MODELS") {
        let models = parse_list(&v);
        if models.is_empty() {
            warn!(key = "SCRIVENER_GEMINI_MODELS", value = %v, "empty model list, ignoring");
        } else {
            settings.generation.models = models;
        }
    }
    if let Some(v) = read("SCRIVENER_GEMINI_BASE") {
        settings.generation.base_url = v;
    }
    if let Some(v) =
        read_in_range::<u64>(&read, "SCRIVENER_MIN_CALL_INTERVAL_MS", 0, 600_000)
    {
        settings.generation.min_call_interval_ms = v;
    }

    // ── Transcription ───────────────────────────────────────────────
    if let Some(v) = read_in_range::<u64>(&read, "SCRIVENER_POLL_INTERVAL_MS", 1, 600_000) {
        settings.transcription.poll_interval_ms = v;
    }
    if let Some(v) =
        read_in_range::<u64>(&read, "SCRIVENER_MAX_POLL_DURATION_MS", 1000, 86_400_000)
    {
        settings.transcription.max_poll_duration_ms = Some(v);
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a number within an inclusive range.
pub fn parse_in_range<T: FromStr + PartialOrd>(val: &str, min: T, max: T) -> Option<T> {
    let n: T = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Split a comma-separated list, dropping blanks.
pub fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_log_format(val: &str) -> Option<LogFormat> {
    serde_json::from_value(Value::String(val.trim().to_lowercase())).ok()
}

fn read_in_range<T: FromStr + PartialOrd>(
    read: &impl Fn(&str) -> Option<String>,
    name: &str,
    min: T,
    max: T,
) -> Option<T> {
    let val = read(name)?;
    let result = parse_in_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid numeric env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
