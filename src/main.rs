use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use footfall::api;
use footfall::config::{Config, LogLevel};
use footfall::counter::{Counter, MemoryCounter};

#[derive(Parser)]
#[command(name = "footfall")]
#[command(about = "Unique page visitor counting service", long_about = None)]
struct Cli {
    /// TCP address to listen on for incoming connections (IP:PORT)
    #[arg(long)]
    listen: Option<String>,

    /// Enable CORS support
    #[arg(long)]
    cors: bool,

    /// Log verbosity (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Resolve configuration before logging so the level is fixed from the start
    let config = Config::from_env()?.with_overrides(
        cli.listen.as_deref(),
        cli.cors,
        cli.log_level,
    )?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Loaded configuration (log level: {})", config.logging.level);

    let counter: Arc<dyn Counter> = Arc::new(MemoryCounter::new());

    if config.cors.enabled {
        info!("🌐 CORS enabled - cross-origin requests are allowed");
    }
    let router = api::create_api_router(Arc::clone(&counter), &config.cors);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Visit counter listening on http://{}", addr);
    info!("   - POST http://{}/visits/new", addr);
    info!("   - GET  http://{}/visits/stats?url=...", addr);

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match &result {
        Ok(()) => info!("HTTP server stopped after shutdown signal"),
        Err(e) => tracing::error!("HTTP server stopped. Reason: {}", e),
    }
    info!("Tracked {} pages during this run", counter.pages());

    result.context("HTTP server failed")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
