use crate::config::ServerConfig;
use crate::room::{CoordinatorStats, SessionCoordinator};
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state behind every route.
pub struct AppState {
    pub signaling: SignalingService,
    pub coordinator: SessionCoordinator,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let signaling = SignalingService::new(config.ice_servers());
        let coordinator =
            SessionCoordinator::with_buffer(Arc::new(signaling.clone()), config.room_command_buffer);

        Self {
            signaling,
            coordinator,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/stats", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<CoordinatorStats> {
    Json(state.coordinator.stats().await)
}

/// Binds and runs the coordinator until the listener fails.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Signaling server listening on http://{}", config.bind_addr);

    axum::serve(listener, router(AppState::new(&config)))
        .await
        .context("Signaling server stopped")?;
    Ok(())
}
