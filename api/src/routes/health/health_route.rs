use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub ollama_model: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`.
    pub status: &'static str,
    /// `connected` or `not_available`.
    pub ollama: &'static str,
    pub model: String,
    pub latency_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /
pub async fn root_route(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        service: "GitLab MR Reviewer",
        ollama_model: state.llm.model.clone(),
    })
}

/// GET /health
///
/// Always 200. An unreachable generation backend is reported as `degraded`.
pub async fn health_route(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let probe = state.health.check(&state.llm).await;
    Json(if probe.ok {
        HealthResponse {
            status: "healthy",
            ollama: "connected",
            model: probe.model,
            latency_ms: probe.latency_ms,
            model_available: probe.model_available,
            error: None,
        }
    } else {
        HealthResponse {
            status: "degraded",
            ollama: "not_available",
            model: probe.model,
            latency_ms: probe.latency_ms,
            model_available: None,
            error: Some(probe.message),
        }
    })
}
