//! # scrivener-llm
//!
//! Generative-text provider plumbing shared by every text operation:
//! - [`GenerativeBackend`]: the `list_models` / `construct` / `generate` seam
//! - [`GeminiBackend`]: REST implementation against the Gemini API
//! - [`ProviderError`] with textual failure classification
//! - [`RateLimiter`]: process-wide minimum spacing between provider calls
//! - [`ProviderSelector`]: first constructible model from the preference list
//! - [`ModelHealthTracker`]: rolling per-model outcome window

#![deny(unsafe_code)]

pub mod google;
pub mod health;
pub mod provider;
pub mod rate_limit;
pub mod selector;

pub use google::{GeminiBackend, GeminiConfig};
pub use health::{ModelHealth, ModelHealthTracker};
pub use provider::{FailureClass, GenerativeBackend, ModelHandle, ProviderError, ProviderResult};
pub use rate_limit::RateLimiter;
pub use selector::{ModelProbe, ProbeOutcome, ProbeReport, ProviderSelector};
