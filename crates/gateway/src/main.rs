//! Glossify API server
//!
//! Loads configuration, connects the database, installs the Prometheus
//! recorder and serves the HTTP API until SIGINT/SIGTERM.

use glossify_common::{config::AppConfig, llm, metrics, DbPool, Repository};
use glossify_gateway::{create_router, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    init_tracing(&config);

    info!("Starting Glossify API v{}", glossify_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    let prometheus = PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Suffix("analysis_duration_seconds".to_string()),
            metrics::MODEL_BUCKETS,
        )?
        .install_recorder()?;
    metrics::register_metrics();

    // Initialize database connection
    let pool = DbPool::new(&config.database).await?;
    let repo = Repository::new(pool);
    repo.migrate().await?;

    // Language model
    let model = llm::create_language_model(&config.llm)?;
    info!(provider = %config.llm.provider, model = model.model_name(), "Language model ready");
    if config.llm.timeout().is_none() {
        warn!("No llm.timeout_secs configured; model calls wait for the provider");
    }

    // Create app state
    let state = AppState::new(config.clone(), repo, model).with_metrics(prometheus);

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(upload_dir = %config.storage.upload_dir.display(), "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
