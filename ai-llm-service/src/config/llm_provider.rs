/// Backend used for text generation.
///
/// Only a local Ollama runtime is wired today; the enum keeps the config
/// shape ready for other providers without touching call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
}
