//! `ScrivenerServer`: router assembly and the listener task.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info};

use crate::error::{ApiError, ServerError};
use crate::handlers::{self, status, text, transcribe};
use crate::shutdown::ShutdownCoordinator;
use crate::state::AppState;

/// HTTP server over a prepared [`AppState`].
pub struct ScrivenerServer {
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl ScrivenerServer {
    /// Create a server.
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Build the router with every route and layer.
    pub fn router(&self) -> Router {
        let server = &self.state.settings.server;
        let limit = server.max_upload_bytes;

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO));

        let mut router = Router::new()
            .route("/health", get(status::health))
            .route("/api-status", get(status::api_status))
            .route("/test-models", get(status::test_models))
            .route("/metrics", get(status::metrics))
            .route("/transcribe", post(transcribe::transcribe))
            .route("/enhance-text", post(text::enhance))
            .route("/translate-text", post(text::translate))
            .route("/summarize-text", post(text::summarize))
            .route("/process-live-text", post(text::process_live))
            .fallback(handlers::not_found)
            .layer(DefaultBodyLimit::max(limit))
            .layer(RequestBodyLimitLayer::new(limit))
            .layer(middleware::map_response_with_state(limit, json_payload_too_large))
            .layer(trace_layer);

        if server.cors_allow_all {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }
        router.with_state(self.state.clone())
    }

    /// Bind `host:port` and serve until shutdown is signalled.
    ///
    /// Returns the bound address (useful with port 0) and the serving task.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let server = &self.state.settings.server;
        let addr = format!("{}:{}", server.host, server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let app = self.router();
        let signal = self.shutdown.signal();
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
            {
                error!(error = %e, "server terminated");
            }
        });
        info!(addr = %local, "listening");
        Ok((local, handle))
    }
}

/// Rewrite any non-JSON 413 (e.g. from the body limit layer) into the
/// standard error envelope.
async fn json_payload_too_large(State(limit): State<usize>, response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return ApiError::payload_too_large(limit).into_response();
    }
    response
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
