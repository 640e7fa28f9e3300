//! Scripted generative backend shared by the runtime integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scrivener_core::ManualClock;
use scrivener_llm::{
    GenerativeBackend, ModelHandle, ProviderError, ProviderResult, ProviderSelector, RateLimiter,
};
use scrivener_runtime::TextOperation;

type Reply = Box<dyn Fn(&str) -> ProviderResult<String> + Send + Sync>;

/// Backend that answers every prompt through a closure and records prompts.
pub struct ScriptedBackend {
    configured: bool,
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(reply: impl Fn(&str) -> ProviderResult<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            reply: Box::new(reply),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            configured: false,
            reply: Box::new(|_| Ok("unreachable".into())),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }
    fn is_configured(&self) -> bool {
        self.configured
    }
    fn list_models(&self) -> Vec<String> {
        vec!["fake-1".into()]
    }
    fn default_model(&self) -> &str {
        "fake-1"
    }
    fn construct(&self, model: &str) -> ProviderResult<ModelHandle> {
        Ok(ModelHandle::usable(model))
    }
    async fn generate(&self, _model: &ModelHandle, prompt: &str) -> ProviderResult<String> {
        self.prompts.lock().push(prompt.to_string());
        (self.reply)(prompt)
    }
}

/// Error the provider returns when its model catalog no longer has the model.
pub fn model_not_found() -> ProviderError {
    ProviderError::Api {
        status: 404,
        message: "models/fake-1 is not found for API version v1beta".into(),
        code: Some("NOT_FOUND".into()),
        retryable: false,
    }
}

/// Quota exhaustion.
pub fn quota_exceeded() -> ProviderError {
    ProviderError::RateLimited {
        message: "Resource has been exhausted (e.g. check quota).".into(),
    }
}

/// Anything the classification does not recognize.
pub fn internal_error() -> ProviderError {
    ProviderError::Api {
        status: 500,
        message: "Internal error encountered.".into(),
        code: Some("INTERNAL".into()),
        retryable: true,
    }
}

/// Engine over `backend` with a manual clock and a 2 s limiter.
pub fn engine(backend: Arc<ScriptedBackend>) -> (TextOperation, Arc<ManualClock>) {
    let (clock, shared) = ManualClock::shared();
    let limiter = Arc::new(RateLimiter::new(Duration::from_secs(2), Arc::clone(&shared)));
    let ops = TextOperation::new(ProviderSelector::new(backend), limiter, shared);
    (ops, clock)
}

/// Text the prompt embeds after the instruction.
pub fn embedded_text(prompt: &str) -> &str {
    prompt.split_once("\n\n").map_or("", |(_, text)| text)
}
