//! Liveness probe for the generation backend.
//!
//! - Ollama: `GET {endpoint}/api/tags` (best-effort model existence check)
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for a `/health` endpoint.
//! [`HealthService::check`] is resilient and never fails (errors mapped to `ok=false`).

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::default_config::HEALTH_TIMEOUT_SECS;
use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for the configured backend.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g. "Ollama").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model the service is configured with.
    pub model: String,
    /// Overall reachability flag.
    pub ok: bool,
    /// Whether the configured model appears in the backend's tag list.
    pub model_available: Option<bool>,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(
        cfg: &LlmModelConfig,
        ok: bool,
        model_available: Option<bool>,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            model_available,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Probe runner with its own short-timeout HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional timeout (seconds, default 5).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(HEALTH_TIMEOUT_SECS));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(timeout_secs = timeout.as_secs(), "HealthService initialized");

        Ok(Self { client })
    }

    /// Checks backend reachability. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        match self.try_probe_ollama(cfg).await {
            Ok(status) => {
                info!(
                    endpoint = %status.endpoint,
                    model = %status.model,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(cfg, false, None, start.elapsed().as_millis(), err.to_string());
                warn!(
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict Ollama probe. Returns an error on hard failures.
    async fn try_probe_ollama(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let url = format!("{}/api/tags", endpoint.trim_end_matches('/'));
        let start = Instant::now();
        debug!(model = %cfg.model, "GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })
            .into());
        }

        // Expected minimal JSON: { "models": [ { "name": "<model>" }, ... ] }
        #[derive(Deserialize)]
        struct Tag {
            name: String,
        }
        #[derive(Deserialize)]
        struct Tags {
            models: Option<Vec<Tag>>,
        }

        let status = match resp.json::<Tags>().await {
            Ok(Tags {
                models: Some(models),
            }) => {
                let exists = models.iter().any(|m| m.name == cfg.model);
                let message = if exists {
                    "Ollama is healthy; model is available"
                } else {
                    "Ollama is up, but model not found in /api/tags"
                };
                HealthStatus::new(cfg, true, Some(exists), latency, message)
            }
            Ok(Tags { models: None }) => HealthStatus::new(
                cfg,
                true,
                None,
                latency,
                "Ollama is healthy; tags response without `models` field",
            ),
            Err(e) => {
                warn!(error = %e, "failed to decode /api/tags; treating server as reachable");
                HealthStatus::new(
                    cfg,
                    true,
                    None,
                    latency,
                    format!("Ollama is reachable; failed to decode /api/tags: {e}"),
                )
            }
        };
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::llm_provider::LlmProvider;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".into(),
            endpoint: endpoint.into(),
            timeout_secs: None,
        }
    }

    #[tokio::test]
    async fn reports_model_availability() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{ "name": "llama3" }, { "name": "qwen3:14b" }]
            })))
            .mount(&server)
            .await;

        let status = HealthService::new(None)
            .unwrap()
            .check(&cfg(&server.uri()))
            .await;
        assert!(status.ok);
        assert_eq!(status.model_available, Some(true));
    }

    #[tokio::test]
    async fn error_status_is_degraded_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let status = HealthService::new(None)
            .unwrap()
            .check(&cfg(&server.uri()))
            .await;
        assert!(!status.ok);
        assert!(status.message.contains("503"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_degraded() {
        let status = HealthService::new(Some(1))
            .unwrap()
            .check(&cfg("http://127.0.0.1:9"))
            .await;
        assert!(!status.ok);
    }
}
