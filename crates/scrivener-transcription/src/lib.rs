//! Speech-to-text for uploaded media.
//!
//! ```text
//! media bytes → upload → upload URL → create job → job id
//! → poll status every interval → Completed (transcript) | Failed (error)
//! ```
//!
//! [`TranscriptionClient`] owns the submit/poll state machine and talks to
//! a [`SpeechToText`] backend; [`AssemblyAiBackend`] is the REST one.

#![deny(unsafe_code)]

pub mod assemblyai;
pub mod backend;
pub mod client;
pub mod media;
pub mod types;

pub use assemblyai::{AssemblyAiBackend, AssemblyAiConfig};
pub use backend::SpeechToText;
pub use client::{PollSettings, TranscriptionClient};
pub use types::{JobSnapshot, JobStatus, TranscriptionError, TranscriptionJob, Word};
