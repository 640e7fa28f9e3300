//! Google Gemini backend over the `generateContent` REST endpoint.

pub mod provider;
pub mod types;

pub use provider::GeminiBackend;
pub use types::GeminiConfig;
