//! # scrivener-settings
//!
//! Configuration for the Scrivener service, loaded from three layers
//! (in priority order):
//! 1. **Compiled defaults**: [`ScrivenerSettings::default()`]
//! 2. **Settings file**: `~/.scrivener/settings.json` or an explicit path
//!    (deep-merged over defaults)
//! 3. **Environment variables**: provider credentials and `SCRIVENER_*`
//!    overrides (highest priority)
//!
//! Credentials are read but never serialized back out.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides_from, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::*;
