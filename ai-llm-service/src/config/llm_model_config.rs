use crate::config::llm_provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// One value describes one logical profile (e.g. the chat model or the
/// embedding model). Clients are cached per distinct config.
///
/// # Fields
///
/// - `provider`: Which LLM provider/backend to use (Ollama or OpenAI).
/// - `model`: The model identifier (e.g., `"mistral"`, `"gpt-4o-mini"`).
/// - `endpoint`: Base URL of the inference server.
/// - `api_key`: Optional API key for providers that require authentication.
/// - `max_tokens`: Maximum number of tokens to generate (if supported).
/// - `temperature`: Default sampling temperature for this profile.
/// - `top_p`: Nucleus sampling cutoff.
/// - `timeout_secs`: Optional request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     model: "mistral".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     api_key: None,
///     max_tokens: None,
///     temperature: Some(0.7),
///     top_p: None,
///     timeout_secs: Some(120),
/// };
/// assert_eq!(cfg.model, "mistral");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Inference endpoint base URL.
    pub endpoint: String,

    /// Optional API key for authentication (e.g., OpenAI).
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (controls creativity).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
