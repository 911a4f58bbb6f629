//! Thin Ollama client for non-streaming text generation.
//!
//! - `POST {endpoint}/api/generate` with `{ model, prompt, stream: false }`
//! - expects `{ response: string }`
//!
//! Every call resolves to a [`GenerationResult`]. Transport and status
//! failures are values, never panics or bubbled errors, so the caller can
//! turn them into a user-visible message. No retries happen here.
//!
//! # Examples
//!
//! ```no_run
//! use ai_llm_service::{GenerationResult, LlmModelConfig, LlmProvider, OllamaService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = OllamaService::new(LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "qwen3:14b".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     timeout_secs: Some(120),
//! })?;
//!
//! match svc.generate("Say hi.", "qwen3:14b").await {
//!     GenerationResult::Text(t) => println!("{t}"),
//!     other => eprintln!("{}", other.failure_message().unwrap_or_default()),
//! }
//! # Ok(()) }
//! ```

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::llm_provider::LlmProvider;
use crate::error_handler::make_snippet;
use crate::config::llm_model_config::LlmModelConfig;

/// Errors produced while building or calling [`OllamaService`].
#[derive(Debug, Error)]
pub enum OllamaError {
    /// The provider in the config is not Ollama.
    #[error("[AI LLM Service] invalid provider: expected Ollama")]
    InvalidProvider,

    /// Invalid endpoint (empty or missing http/https).
    #[error("[AI LLM Service] invalid Ollama endpoint: {0}")]
    InvalidEndpoint(String),

    /// Transport/HTTP client error.
    #[error("[AI LLM Service] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from upstream.
    #[error("[AI LLM Service] unexpected HTTP status {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Unexpected/invalid JSON response.
    #[error("[AI LLM Service] failed to decode response: {0}")]
    Decode(String),
}

/// Outcome of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// Generated text.
    Text(String),
    /// The request exceeded the configured timeout.
    TimedOut,
    /// The backend could not be reached (DNS, refused, reset).
    ConnectionFailed(String),
    /// Anything else: non-2xx status, undecodable body.
    UnexpectedFailure(String),
}

impl GenerationResult {
    /// Human-readable failure text, or `None` for [`GenerationResult::Text`].
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Text(_) => None,
            Self::TimedOut => {
                Some("Request to the generation backend timed out. Please try again.".into())
            }
            Self::ConnectionFailed(detail) => Some(format!(
                "Failed to connect to the generation backend: {detail}"
            )),
            Self::UnexpectedFailure(detail) => Some(format!("Generation failed: {detail}")),
        }
    }

    fn from_error(err: OllamaError, endpoint: &str) -> Self {
        match err {
            OllamaError::Transport(e) if e.is_timeout() => Self::TimedOut,
            OllamaError::Transport(e) if e.is_connect() || e.is_request() => {
                Self::ConnectionFailed(format!("{endpoint}: {e}"))
            }
            other => Self::UnexpectedFailure(other.to_string()),
        }
    }
}

/// Thin client for Ollama, one reusable `reqwest::Client` per service.
#[derive(Debug, Clone)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`OllamaError::InvalidProvider`] if `cfg.provider` is not `Ollama`
    /// - [`OllamaError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`OllamaError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, OllamaError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(OllamaError::InvalidProvider);
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(OllamaError::InvalidEndpoint(cfg.endpoint));
        }

        let timeout = Duration::from_secs(
            cfg.timeout_secs
                .unwrap_or(crate::config::default_config::REVIEW_TIMEOUT_SECS),
        );

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let url_generate = format!("{}/api/generate", endpoint.trim_end_matches('/'));

        Ok(Self {
            client,
            cfg,
            url_generate,
        })
    }

    /// Configured default model name.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Performs one non-streaming generation with `model`.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn generate(&self, prompt: &str, model: &str) -> GenerationResult {
        match self.try_generate(prompt, model).await {
            Ok(text) => GenerationResult::Text(text),
            Err(err) => {
                error!(error = %err, "generation call failed");
                GenerationResult::from_error(err, &self.cfg.endpoint)
            }
        }
    }

    async fn try_generate(&self, prompt: &str, model: &str) -> Result<String, OllamaError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        debug!(prompt_chars = prompt.len(), "POST {}", self.url_generate);
        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(OllamaError::HttpStatus {
                status,
                url: self.url_generate.clone(),
                snippet: make_snippet(&text),
            });
        }

        let out: GenerateResponse = resp.json().await.map_err(|e| {
            OllamaError::Decode(format!("serde error: {e}; ensure `stream=false` is used"))
        })?;

        Ok(out.response)
    }
}

/// Request body for `/api/generate` (non-streaming).
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body for `/api/generate`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
