//! modelgate binary.
//!
//! - Config: `MODELGATE_CONFIG` (default `modelgate.yaml`) plus `MODELGATE_*` overrides
//! - Endpoint: `POST /v1/orm/{method}/{model}`
//! - Graceful shutdown on Ctrl-C (readyz flips to 503 first)

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use modelgate_core::error::{ModelGateError, Result};
use modelgate_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("MODELGATE_CONFIG").unwrap_or_else(|_| "modelgate.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.gateway.listen.parse().map_err(|e| {
        ModelGateError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}"))
    })?;

    let state = app_state::AppState::new(cfg)?;
    let metrics = state.metrics();
    let app = router::build_router(state);

    tracing::info!(%listen, "modelgate starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ModelGateError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::error!("failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
            metrics.set_draining();
            tracing::info!("shutdown requested, draining");
        })
        .await
        .map_err(|e| ModelGateError::Internal(format!("server failed: {e}")))?;

    tracing::info!("modelgate stopped");
    Ok(())
}
