use crate::config::llm_provider::LlmProvider;

/// Configuration for one generation model.
///
/// # Fields
///
/// - `provider`: backend kind (currently only Ollama).
/// - `model`: model identifier, e.g. `"qwen3:14b"`.
/// - `endpoint`: base URL of the backend, e.g. `"http://localhost:11434"`.
/// - `timeout_secs`: request timeout for a single generation call.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     model: "qwen3:14b".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     timeout_secs: Some(120),
/// };
/// assert_eq!(cfg.model, "qwen3:14b");
/// ```
#[derive(Debug, Clone)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Backend base URL (no trailing `/api/...`).
    pub endpoint: String,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
