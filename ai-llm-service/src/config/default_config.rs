//! Generation config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = review model (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, must_var, validate_http_endpoint},
};

/// Timeout for one review generation call.
pub const REVIEW_TIMEOUT_SECS: u64 = 120;

/// Timeout for the liveness probe.
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Ok(url) = must_var(lookup, "OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url.trim_end_matches('/').to_string());
    }
    if let Ok(port) = must_var(lookup, "OLLAMA_PORT") {
        port.parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT"))
}

/// Constructs the review model config through an arbitrary lookup.
///
/// # Defaults
/// - `timeout_secs = Some(120)`
///
/// # Errors
/// - [`ConfigError::MissingVar`] if the endpoint or model is absent
/// - [`ConfigError::InvalidFormat`] if `OLLAMA_URL` has no http(s) scheme
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is not a port
pub fn config_ollama_review_from<F>(lookup: F) -> Result<LlmModelConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoint = ollama_endpoint(&lookup)?;
    let model = must_var(&lookup, "OLLAMA_MODEL")?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        timeout_secs: Some(REVIEW_TIMEOUT_SECS),
    })
}
