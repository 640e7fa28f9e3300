//! # scrivener-server
//!
//! Axum HTTP surface over the transcription client and the text pipeline.
//!
//! - Upload transcription with temporary media spooling
//! - JSON endpoints for enhance / translate / summarize / live processing
//! - Health, provider status, model probe and Prometheus metrics
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod state;

pub use error::{ApiError, ServerError};
pub use server::ScrivenerServer;
pub use state::AppState;
