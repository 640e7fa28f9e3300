//! Model selection over the backend's preference list.
//!
//! Every call re-probes: a model the provider retires drops out of
//! selection on the next request. Probing is construction only, so a
//! selection costs no network round trip.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::provider::{GenerativeBackend, ModelHandle, ProviderResult};
use crate::rate_limit::RateLimiter;

/// Prompt sent by [`ProviderSelector::probe`].
pub const PROBE_PROMPT: &str = "Say hello";

const PROBE_SAMPLE_CHARS: usize = 50;
const PROBE_ERROR_CHARS: usize = 200;

/// Picks the first constructible model.
#[derive(Clone)]
pub struct ProviderSelector {
    backend: Arc<dyn GenerativeBackend>,
}

/// Result of probing one model with a live generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelProbe {
    /// Model identifier.
    pub model: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

/// Outcome of a single model probe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeOutcome {
    /// The model answered; `response` holds the start of its text.
    Working {
        /// First characters of the generated text.
        response: String,
    },
    /// Construction or generation failed.
    Failed {
        /// First characters of the error message.
        error: String,
    },
}

/// Probe results in request order plus the first working model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    /// Per-model results.
    pub results: Vec<ModelProbe>,
    /// First model that answered, if any.
    pub recommended: Option<String>,
}

impl ProviderSelector {
    /// Create a selector over `backend`.
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// The backend selections are made against.
    pub fn backend(&self) -> &Arc<dyn GenerativeBackend> {
        &self.backend
    }

    /// Return the first model in preference order whose construction
    /// succeeds, else the backend's default model.
    ///
    /// A construction failure of the default model is returned to the caller.
    pub fn select(&self) -> ProviderResult<ModelHandle> {
        for candidate in self.backend.list_models() {
            match self.backend.construct(&candidate) {
                Ok(handle) => {
                    info!(model = %handle.name, "selected generation model");
                    return Ok(handle);
                }
                Err(e) => {
                    debug!(model = %candidate, error = %e, "model candidate rejected");
                }
            }
        }

        let default = self.backend.default_model();
        warn!(model = %default, "no preferred model usable, trying default");
        self.backend.construct(default)
    }

    /// Construct each model and ask it for a short greeting, pacing every
    /// call through `limiter`.
    #[instrument(skip_all, fields(models = models.len()))]
    pub async fn probe(&self, models: &[String], limiter: &RateLimiter) -> ProbeReport {
        let mut results = Vec::with_capacity(models.len());
        for model in models {
            let outcome = match self.backend.construct(model) {
                Ok(handle) => {
                    let _ = limiter.acquire().await;
                    match self.backend.generate(&handle, PROBE_PROMPT).await {
                        Ok(text) if text.trim().is_empty() => ProbeOutcome::Working {
                            response: "empty response".to_string(),
                        },
                        Ok(text) => ProbeOutcome::Working {
                            response: text.chars().take(PROBE_SAMPLE_CHARS).collect(),
                        },
                        Err(e) => ProbeOutcome::Failed {
                            error: e.to_string().chars().take(PROBE_ERROR_CHARS).collect(),
                        },
                    }
                }
                Err(e) => ProbeOutcome::Failed {
                    error: e.to_string().chars().take(PROBE_ERROR_CHARS).collect(),
                },
            };
            debug!(model = %model, working = matches!(outcome, ProbeOutcome::Working { .. }), "probed model");
            results.push(ModelProbe {
                model: model.clone(),
                outcome,
            });
        }

        let recommended = results
            .iter()
            .find(|r| matches!(r.outcome, ProbeOutcome::Working { .. }))
            .map(|r| r.model.clone());
        info!(recommended = recommended.as_deref().unwrap_or("none"), "model probe finished");
        ProbeReport {
            results,
            recommended,
        }
    }
}

impl std::fmt::Debug for ProviderSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSelector")
            .field("backend", &self.backend.name())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use scrivener_core::ManualClock;

    use super::*;
    use crate::provider::ProviderError;

    struct CatalogBackend {
        models: Vec<String>,
        default: String,
        broken: HashSet<String>,
        constructs: AtomicUsize,
    }

    impl CatalogBackend {
        fn new(models: &[&str], default: &str, broken: &[&str]) -> Self {
            Self {
                models: models.iter().map(|m| (*m).to_string()).collect(),
                default: default.to_string(),
                broken: broken.iter().map(|m| (*m).to_string()).collect(),
                constructs: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for CatalogBackend {
        fn name(&self) -> &str {
            "catalog"
        }
        fn is_configured(&self) -> bool {
            true
        }
        fn list_models(&self) -> Vec<String> {
            self.models.clone()
        }
        fn default_model(&self) -> &str {
            &self.default
        }
        fn construct(&self, model: &str) -> ProviderResult<ModelHandle> {
            let _ = self.constructs.fetch_add(1, Ordering::SeqCst);
            if self.broken.contains(model) {
                Err(ProviderError::InvalidModel {
                    model: model.to_string(),
                })
            } else {
                Ok(ModelHandle::usable(model))
            }
        }
        async fn generate(&self, handle: &ModelHandle, _prompt: &str) -> ProviderResult<String> {
            if handle.name == "mute" {
                return Ok(String::new());
            }
            if handle.name.ends_with("-gone") {
                return Err(ProviderError::Api {
                    status: 404,
                    message: format!("models/{} is not found", handle.name),
                    code: None,
                    retryable: false,
                });
            }
            Ok(format!("Hello from {} and a long tail of words that exceeds fifty characters", handle.name))
        }
    }

    fn selector(backend: CatalogBackend) -> (ProviderSelector, Arc<CatalogBackend>) {
        let backend = Arc::new(backend);
        (ProviderSelector::new(backend.clone()), backend)
    }

    #[test]
    fn picks_first_constructible() {
        let (sel, _) = selector(CatalogBackend::new(&["a", "b", "c"], "d", &["a"]));
        assert_eq!(sel.select().unwrap().name, "b");
    }

    #[test]
    fn falls_back_to_default() {
        let (sel, _) = selector(CatalogBackend::new(&["a", "b"], "d", &["a", "b"]));
        let handle = sel.select().unwrap();
        assert_eq!(handle.name, "d");
        assert!(handle.usable);
    }

    #[test]
    fn default_failure_propagates() {
        let (sel, _) = selector(CatalogBackend::new(&["a"], "d", &["a", "d"]));
        assert_matches!(sel.select(), Err(ProviderError::InvalidModel { model }) if model == "d");
    }

    #[test]
    fn every_call_reprobes() {
        let (sel, backend) = selector(CatalogBackend::new(&["a", "b"], "d", &["a"]));
        let _ = sel.select().unwrap();
        let _ = sel.select().unwrap();
        assert_eq!(backend.constructs.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn probe_reports_each_model() {
        let (sel, _) = selector(CatalogBackend::new(&[], "d", &["bad"]));
        let (clock, shared) = ManualClock::shared();
        let limiter = RateLimiter::new(Duration::from_secs(2), shared);
        let models: Vec<String> = ["bad", "old-gone", "good", "mute"]
            .into_iter()
            .map(String::from)
            .collect();

        let report = sel.probe(&models, &limiter).await;

        assert_eq!(report.results.len(), 4);
        assert_matches!(&report.results[0].outcome, ProbeOutcome::Failed { error } if error.contains("bad"));
        assert_matches!(&report.results[1].outcome, ProbeOutcome::Failed { error } if error.contains("404"));
        assert_matches!(&report.results[2].outcome, ProbeOutcome::Working { response } if response.chars().count() == 50);
        assert_matches!(&report.results[3].outcome, ProbeOutcome::Working { response } if response == "empty response");
        assert_eq!(report.recommended.as_deref(), Some("good"));
        // three generations, two paced waits
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn probe_without_working_model_recommends_none() {
        let (sel, _) = selector(CatalogBackend::new(&[], "d", &["x"]));
        let (_clock, shared) = ManualClock::shared();
        let limiter = RateLimiter::new(Duration::ZERO, shared);
        let report = sel.probe(&["x".to_string()], &limiter).await;
        assert!(report.recommended.is_none());
    }

    #[test]
    fn probe_serializes_with_status_tag() {
        let probe = ModelProbe {
            model: "m".into(),
            outcome: ProbeOutcome::Working {
                response: "hi".into(),
            },
        };
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "m", "status": "working", "response": "hi"})
        );
    }
}
