//! # scrivener-core
//!
//! Shared building blocks for the Scrivener transcription service.
//!
//! - **Clock**: [`Clock`] trait with a tokio-backed implementation and a
//!   manually-advanced one for deterministic tests
//! - **Retry**: backoff configuration and delay calculation
//! - **Errors**: provider error-envelope parsing
//! - **Text**: character-safe truncation and word helpers
//! - **Logging**: `tracing` subscriber setup and an in-memory capture layer

#![deny(unsafe_code)]

pub mod clock;
pub mod error_parsing;
pub mod logging;
pub mod retry;
pub mod text;

pub use clock::{Clock, ManualClock, SharedClock, TokioClock};
pub use error_parsing::{ApiErrorInfo, parse_api_error};
pub use retry::{RetryConfig, calculate_backoff_delay};
