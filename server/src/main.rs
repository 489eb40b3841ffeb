//! Portfolio contact API server.
//!
//! Serves `POST /api/contact`, `GET /api/contacts`, `GET /api/resume` and
//! `/health`, plus the built page shell when `--static-dir` is given.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use folio_server::config::DEFAULT_LOG_FILTER;
use folio_server::{router, Cli};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    let state = cli
        .build_state()
        .await
        .context("failed to initialise contact store")?;
    let app = router(Arc::new(state));

    let addr = cli.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "folio server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("folio server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
