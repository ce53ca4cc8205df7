//! MoodStream Server
//!
//! HTTP service that scores social-media posts for sentiment.
//!
//! Posts are scored by a hosted model when one is configured and reachable,
//! otherwise by a local lexicon. Ingested posts are kept in memory and can
//! be listed and summarized per topic.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

mod config;
mod routes;
mod state;
mod store;

use config::ServerConfig;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "moodstream-server")]
#[command(about = "MoodStream sentiment scoring service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "moodstream.yaml")]
    config: String,

    /// Listen address
    #[arg(short = 'l', long, default_value = "0.0.0.0")]
    listen: String,

    /// Listen port
    #[arg(short = 'P', long, default_value = "8080")]
    port: u16,

    /// Credential for the remote inference endpoint
    #[arg(long, env = "HUGGINGFACE_API_KEY", hide_env_values = true)]
    credential: Option<String>,

    /// Score with the lexicon only
    #[arg(long)]
    no_remote: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting MoodStream Server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded");
    info!("Remote tier: {}", if config.scoring.remote_active() { "enabled" } else { "disabled" });
    info!("Batch pacing: {:?}", config.scoring.batch);

    let metrics_handle = init_metrics()?;

    let state = AppState::new(config, metrics_handle)?;
    state.spawn_warm_up();

    let addr: SocketAddr = format!("{}:{}", cli.listen, cli.port).parse()?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("moodstream=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moodstream=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "moodstream_requests_total",
        "Total number of API requests by route"
    );
    metrics::describe_counter!(
        "moodstream_scored_total",
        "Total number of texts scored, by the tier that produced the result"
    );
    metrics::describe_counter!(
        "moodstream_tier_fallbacks_total",
        "Scoring tier failures that fell through to the next tier, by reason"
    );
    metrics::describe_histogram!(
        "moodstream_scoring_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end scoring latency per text in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
