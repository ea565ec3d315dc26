//! HTTP server wiring: shared state, router and the serve loop.

use std::sync::Arc;

use anyhow::Result;
use axum::{Json, Router, routing::get};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use utoipa_axum::router::OpenApiRouter;

use super::commands::DriverCommand;
use super::v0;
use crate::alert::AlertEngine;
use crate::config::ApiConfig;
use crate::tracing::prelude::*;

/// State shared by all handlers.
#[derive(Clone)]
pub struct SharedState {
    pub driver_cmd_tx: mpsc::Sender<DriverCommand>,
    pub engine: Arc<AlertEngine>,
}

/// Build the full router: v0 API under `/api/v0` plus its OpenAPI document.
pub fn router(state: SharedState) -> Router {
    let (router, openapi) = OpenApiRouter::new()
        .nest("/api/v0", v0::routes())
        .split_for_parts();

    router
        .route("/api/openapi.json", get(move || async move { Json(openapi) }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to the configured address and serve until `shutdown` is cancelled.
pub async fn serve(
    config: ApiConfig,
    state: SharedState,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(config.listen).await?;
    serve_on(listener, state, shutdown).await
}

pub async fn serve_on(
    listener: TcpListener,
    state: SharedState,
    shutdown: CancellationToken,
) -> Result<()> {
    info!(addr = %listener.local_addr()?, "API server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    trace!("API server stopped.");
    Ok(())
}
