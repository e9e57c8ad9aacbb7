// llm-monitor-proxy - logging reverse proxy and response cache for LLM provider APIs

use anyhow::Result;
use clap::Parser;
use llm_monitor_proxy::cli::Args;
use llm_monitor_proxy::config::AppConfig;
use llm_monitor_proxy::server::{build_router, AppState};
use llm_monitor_proxy::utils::logging;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, CLI flags on top
    let mut config = AppConfig::load_from(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting llm-monitor-proxy v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build shared state and router
    let state = AppState::new(config.clone())?;
    info!(
        "Proxying {} requests to {}",
        state.upstream.provider(),
        state.upstream.base_url()
    );
    if state.sink.is_enabled() {
        info!("Logs will be sent to {}", state.sink.url());
    } else {
        info!("Monitoring sink disabled, requests are proxied without records");
    }
    if state.cache.is_enabled() {
        info!("Response cache enabled, TTL {}ms", state.cache.config().ttl_ms);
    }
    let app = build_router(state);

    // Phase 4: Bind and serve
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
