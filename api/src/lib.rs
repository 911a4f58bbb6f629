//! HTTP surface of the reviewer: manual trigger, GitLab webhook and liveness.

pub mod core;
pub mod error_handler;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::{AppConfig, AppState, ConfigError};
pub use crate::error_handler::{AppError, AppResult};
use crate::routes::{
    health::health_route::{health_route, root_route},
    review::review_route::review_route,
    webhook::webhook_route::gitlab_webhook_route,
};

/// Builds the router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_route))
        .route("/health", get(health_route))
        .route("/review", get(review_route).post(review_route))
        .route("/webhook/gitlab", post(gitlab_webhook_route))
        .with_state(state)
}

/// Verifies GitLab access, binds the listener and serves until Ctrl+C.
pub async fn start(config: AppConfig) -> AppResult<()> {
    let bind_addr = config.bind_addr.clone();
    let state = AppState::build(config)?;

    state
        .reviewer
        .verify_access()
        .await
        .map_err(|e| AppError::Startup(format!("GitLab authentication failed: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(AppError::Bind)?;
    info!(addr = %bind_addr, model = %state.reviewer.model(), "reviewer listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
