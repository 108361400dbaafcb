//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles are built here:
//!
//! - **Chat**      → the model that answers customer questions
//! - **Embedding** → the model that embeds support documents and queries
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = provider kind (`ollama` (default) or `openai`)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = optional client timeout (u64, default 120)
//! - `EMBEDDING_MODEL` = embedding model (mandatory)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = chat model (mandatory)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` (mandatory)
//! - `OPENAI_MODEL`   (mandatory)
//! - `OPENAI_URL`     (default `https://api.openai.com`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, must_var, opt_number, opt_var, validate_http_endpoint,
    },
};

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const CHAT_TEMPERATURE: f32 = 0.7;

/// Builds the **chat** profile from the process environment.
pub fn config_chat() -> Result<LlmModelConfig, AiLlmError> {
    config_chat_with(&|k: &str| std::env::var(k).ok())
}

/// Builds the **embedding** profile from the process environment.
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    config_embedding_with(&|k: &str| std::env::var(k).ok())
}

/// Builds the **chat** profile through an arbitrary variable lookup.
///
/// # Defaults
/// - `temperature = Some(0.7)`
/// - `timeout_secs = Some(120)` unless `LLM_TIMEOUT_SECS` is set
///
/// # Errors
/// - [`ConfigError::MissingVar`] for missing mandatory variables
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::InvalidFormat`] for malformed values
pub fn config_chat_with<F>(lookup: &F) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = provider(lookup)?;
    let (endpoint, api_key) = endpoint_and_key(lookup, provider)?;
    let model = match provider {
        LlmProvider::Ollama => must_var(lookup, "OLLAMA_MODEL")?,
        LlmProvider::OpenAI => must_var(lookup, "OPENAI_MODEL")?,
    };

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: opt_number(lookup, "LLM_MAX_TOKENS", "expected u32")?,
        temperature: Some(CHAT_TEMPERATURE),
        top_p: None,
        timeout_secs: Some(timeout_secs(lookup)?),
    })
}

/// Builds the **embedding** profile through an arbitrary variable lookup.
///
/// Uses the same provider and endpoint as the chat profile.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `max_tokens = None`
pub fn config_embedding_with<F>(lookup: &F) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = provider(lookup)?;
    let (endpoint, api_key) = endpoint_and_key(lookup, provider)?;

    Ok(LlmModelConfig {
        provider,
        model: must_var(lookup, "EMBEDDING_MODEL")?,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(timeout_secs(lookup)?),
    })
}

fn provider<F>(lookup: &F) -> Result<LlmProvider, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    match opt_var(lookup, "LLM_KIND") {
        Some(kind) => Ok(kind.parse::<LlmProvider>()?),
        None => Ok(LlmProvider::Ollama),
    }
}

fn timeout_secs<F>(lookup: &F) -> Result<u64, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(opt_number(lookup, "LLM_TIMEOUT_SECS", "expected u64")?.unwrap_or(DEFAULT_TIMEOUT_SECS))
}

fn endpoint_and_key<F>(
    lookup: &F,
    provider: LlmProvider,
) -> Result<(String, Option<String>), AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    match provider {
        LlmProvider::Ollama => Ok((ollama_endpoint(lookup)?, None)),
        LlmProvider::OpenAI => {
            let key = must_var(lookup, "OPENAI_API_KEY")?;
            let url = opt_var(lookup, "OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.into());
            validate_http_endpoint("OPENAI_URL", &url)?;
            Ok((url, Some(key)))
        }
    }
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint<F>(lookup: &F) -> Result<String, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = opt_var(lookup, "OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = opt_var(lookup, "OLLAMA_PORT") {
        port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "OLLAMA_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}
