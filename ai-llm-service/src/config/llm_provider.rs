use std::{fmt, str::FromStr};

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// The answer engine never branches on this value; only the service layer
/// routes requests to the matching HTTP client.
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// let p: LlmProvider = "ollama".parse().unwrap();
/// assert_eq!(p, LlmProvider::Ollama);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
    /// OpenAI or any OpenAI-compatible chat completions API.
    OpenAI,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Ollama => f.write_str("Ollama"),
            LlmProvider::OpenAI => f.write_str("OpenAI"),
        }
    }
}
