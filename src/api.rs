use axum::{extract::State, response::Json, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::Config,
    error::VolumeError,
    models::VolumeResponse,
    rpc::Connector,
    volume,
};

/// Shared, read-only state of every request.
pub struct AppState<C> {
    pub cfg: Arc<Config>,
    pub connector: Arc<C>,
}

impl<C> AppState<C> {
    pub fn new(cfg: Config, connector: C) -> Self {
        Self {
            cfg: Arc::new(cfg),
            connector: Arc::new(connector),
        }
    }
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            cfg: Arc::clone(&self.cfg),
            connector: Arc::clone(&self.connector),
        }
    }
}

pub fn router<C: Connector>(state: AppState<C>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Market volume API running" }))
        .route("/healthz", get(|| async { "ok" }))
        .route("/test", get(total_volume::<C>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

pub async fn serve<C: Connector>(listener: TcpListener, state: AppState<C>) -> eyre::Result<()> {
    info!("API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, stopping...");
    }
}

async fn total_volume<C: Connector>(State(state): State<AppState<C>>) -> Result<Json<VolumeResponse>, VolumeError> {
    let total = volume::compute_total_volume(&state.cfg, state.connector.as_ref()).await?;

    Ok(Json(VolumeResponse {
        total_volume: total.to_string(),
    }))
}
