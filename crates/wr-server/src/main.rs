//! `walkroute` — serve shortest walking paths between two addresses.
//!
//! ```text
//! GRAPH_PATH=graph_bundle.json GEOCODER=nominatim cargo run --release
//! curl -X POST localhost:8000/api/py/shortest-path \
//!      -H 'content-type: application/json' \
//!      -d '{"start_address": "Ferry Building, SF", "end_address": "Coit Tower, SF"}'
//! ```

use std::sync::Arc;

use anyhow::Context;

use wr_server::{api, graph, logging, Config, RouteService};
use wr_spatial::DijkstraRouter;

#[tokio::main]
async fn main() {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();
    logging::init();

    if let Err(e) = run().await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    config.log();

    let network = graph::load_network(&config.graph, &config.client.user_agent).await?;
    let geocoder = config.geocoder.build(&config.client)?;
    let service = Arc::new(RouteService::new(
        Arc::new(network),
        geocoder,
        Arc::new(DijkstraRouter),
        config.snap_warn_m,
    ));
    let app = api::router(service, api::cors_layer(&config.cors_origins)?);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
