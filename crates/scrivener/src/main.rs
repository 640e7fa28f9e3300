//! # scrivener
//!
//! Transcription server binary: loads settings, wires the providers and
//! serves the HTTP API until ctrl-c.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scrivener_core::logging::{self, LogFormat};
use scrivener_server::{AppState, ScrivenerServer, metrics};
use scrivener_settings::ScrivenerSettings;
use scrivener_settings::loader;

/// Scrivener transcription server.
#[derive(Parser, Debug)]
#[command(name = "scrivener", about = "Audio transcription and text processing server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Settings file (defaults to `~/.scrivener/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log filter directive (overrides settings).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn load_settings(&self) -> Result<ScrivenerSettings> {
        let path = self.settings.clone().unwrap_or_else(loader::settings_path);
        let mut settings = loader::load_settings_from_path(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        self.apply(&mut settings);
        Ok(settings)
    }

    fn apply(&self, settings: &mut ScrivenerSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(level) = &self.log_level {
            settings.server.log_level.clone_from(level);
        }
        if self.json_logs {
            settings.server.log_format = LogFormat::Json;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = args.load_settings()?;

    logging::init_subscriber(&settings.server.log_level, settings.server.log_format);

    if !settings.transcription.is_configured() {
        tracing::warn!("no transcription API key; /transcribe will fail");
    }
    if !settings.generation.is_configured() {
        tracing::warn!("no generation API key; text operations will report not configured");
    }

    let state = AppState::from_settings(settings)
        .context("Failed to initialize providers")?
        .with_metrics(metrics::install_recorder());
    let server = ScrivenerServer::new(state);
    let (addr, handle) = server.listen().await.context("Failed to start server")?;
    tracing::info!("Scrivener listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().drain(vec![handle], None).await;
    tracing::info!("Shutdown complete");
    Ok(())
}
