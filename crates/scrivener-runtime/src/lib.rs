//! # scrivener-runtime
//!
//! What happens to a transcript after the speech-to-text provider is done
//! with it.
//!
//! - **Text operations**: enhance / translate / summarize through the
//!   generative-text provider, paced by the shared rate limiter, retried on
//!   quota errors and degraded to local heuristics when the provider cannot
//!   serve the request
//! - **Fallback**: provider-free enhancement heuristics
//! - **Pipeline**: translation, then structure / expressions / summary, with
//!   every stage's outcome recorded independently

#![deny(unsafe_code)]

pub mod fallback;
pub mod operation;
pub mod pipeline;

pub use fallback::{EnhancementKind, basic_text_enhancement};
pub use operation::{Operation, TextOperation, TextOperationResult, is_noop_language};
pub use pipeline::{Pipeline, PipelineResult, Stage};
