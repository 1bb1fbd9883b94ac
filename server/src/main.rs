//! Server entrypoint for the ensemble reasoning gateway.
//!
//! Wires the layers together with dependency injection: configuration
//! loading, logging, the process-wide HTTP client behind the model
//! client adapter, the orchestrator, and the axum ingress.

mod api;
mod routes;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use ensemble_application::RunEnsembleUseCase;
use ensemble_infrastructure::{ConfigLoader, OpenAiModelClient};
use routes::create_router;
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable carrying the upstream API key. Secrets never
/// come from the configuration document.
const API_KEY_ENV: &str = "ENSEMBLE_UPSTREAM_API_KEY";

#[derive(Parser, Debug)]
#[command(
    name = "ensemble-server",
    about = "OpenAI-compatible gateway that answers with an ensemble of reasoning threads",
    version
)]
struct Cli {
    /// Path to the configuration file (otherwise ensemble.toml / XDG
    /// locations are searched)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Format timestamps using local time (via chrono).
struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn,ensemble_server=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTimer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let file_config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to load configuration")?;
    let loaded = file_config
        .into_loaded()
        .context("Invalid configuration")?;

    let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
    if api_key.is_empty() {
        warn!("{} is not set; upstream calls go out unauthenticated", API_KEY_ENV);
    }

    // One shared connection pool for the process lifetime.
    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(loaded.max_in_flight)
        .build()
        .context("Failed to build HTTP client")?;

    let client = Arc::new(OpenAiModelClient::new(
        http,
        loaded.upstream.base_url.clone(),
        api_key,
        loaded.upstream.call_timeout,
        loaded.max_in_flight,
    ));

    let orchestrator = Arc::new(RunEnsembleUseCase::new(client, loaded.ensemble));
    let state = AppState::new(orchestrator, loaded.service.model_name.clone());

    let addr = format!("{}:{}", loaded.service.host, loaded.service.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        "Serving '{}' on {} (main model: {}, threads: {})",
        loaded.service.model_name,
        addr,
        state.orchestrator.config().roles().main,
        state.orchestrator.config().thinking().threads
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
