//! Lightweight Ollama service for text generation and embeddings.
//!
//! This module implements a thin client for the local Ollama API:
//! - `POST {endpoint}/api/generate`: synchronous text generation (`stream=false`)
//! - `POST {endpoint}/api/embeddings`: embeddings retrieval
//!
//! It uses the universal configuration [`LlmModelConfig`] and ensures
//! that the selected provider is [`LlmProvider::Ollama`].
//!
//! # Examples
//!
//! ```no_run
//! use ai_llm_service::{LlmModelConfig, LlmProvider};
//! use ai_llm_service::services::ollama_service::OllamaService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "mistral".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     api_key: None,
//!     max_tokens: Some(256),
//!     temperature: Some(0.7),
//!     top_p: None,
//!     timeout_secs: Some(30),
//! };
//!
//! let svc = OllamaService::new(cfg)?;
//! let text = svc.generate("How do I reset my router?", None, None).await?;
//! println!("Generated:\n{}", text);
//! # Ok(()) }
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::error_handler::{
    AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet,
};

/// Thin client for Ollama.
///
/// Initialized with a full [`LlmModelConfig`]. Reuses an HTTP client with
/// a configurable timeout. Provides high-level calls:
/// - [`OllamaService::generate`]: synchronous text generation
/// - [`OllamaService::embeddings`]: embeddings retrieval
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_generate: String,
    url_embeddings: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `Ollama`
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(provider_err(ProviderErrorKind::InvalidProvider));
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(provider_err(ProviderErrorKind::InvalidEndpoint(
                cfg.endpoint.clone(),
            )));
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_generate = format!("{}/api/generate", base);
        let url_embeddings = format!("{}/api/embeddings", base);

        Ok(Self {
            client,
            cfg,
            timeout,
            url_generate,
            url_embeddings,
        })
    }

    /// Performs a **non-streaming** generation request via `/api/generate`.
    ///
    /// Mapped options:
    /// - `model`        ← `self.cfg.model`
    /// - `prompt`       ← argument
    /// - `system`       ← argument (omitted when `None`)
    /// - `temperature`  ← argument, or `self.cfg.temperature`
    /// - `top_p`        ← `self.cfg.top_p`
    /// - `num_predict`  ← `self.cfg.max_tokens`
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = GenerateRequest::from_cfg(&self.cfg, prompt, system, temperature);

        debug!(prompt_len = prompt.len(), "POST {}", self.url_generate);
        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_generate.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "Ollama /api/generate returned non-success status"
            );
            return Err(provider_err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })));
        }

        let out: GenerateResponse = resp.json().await.map_err(|e| {
            provider_err(ProviderErrorKind::Decode(format!(
                "serde error: {e}; ensure `stream=false` is used"
            )))
        })?;

        debug!(latency_ms = started.elapsed().as_millis(), "generation completed");
        Ok(out.response)
    }

    /// Retrieves embeddings via `/api/embeddings`.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        debug!(input_len = input.len(), "POST {}", self.url_embeddings);
        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embeddings.clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(provider_err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })));
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            provider_err(ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `{{ embedding: number[] }}`"
            )))
        })?;

        if out.embedding.is_empty() {
            return Err(provider_err(ProviderErrorKind::Decode(
                "empty embedding vector".into(),
            )));
        }

        Ok(out.embedding)
    }
}

fn provider_err(kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(LlmProvider::Ollama, kind).into()
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/api/generate` (non-streaming).
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

impl<'a> GenerateRequest<'a> {
    /// Builds a request from config, prompt, and per-call overrides.
    fn from_cfg(
        cfg: &'a LlmModelConfig,
        prompt: &'a str,
        system: Option<&'a str>,
        temperature: Option<f32>,
    ) -> Self {
        let options = GenerateOptions {
            temperature: temperature.or(cfg.temperature),
            top_p: cfg.top_p,
            num_predict: cfg.max_tokens,
        };

        Self {
            model: &cfg.model,
            prompt,
            system,
            stream: false,
            options: Some(options),
        }
    }
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Response body for `/api/generate`; the generated text is in `response`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Request body for `/api/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response body for `/api/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "mistral".into(),
            endpoint: "http://localhost:11434/".into(),
            api_key: None,
            max_tokens: Some(128),
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn rejects_foreign_provider_and_bad_endpoint() {
        let mut c = cfg();
        c.provider = LlmProvider::OpenAI;
        assert!(OllamaService::new(c).is_err());

        let mut c = cfg();
        c.endpoint = "ollama:11434".into();
        assert!(OllamaService::new(c).is_err());
    }

    #[test]
    fn request_body_prefers_call_temperature() {
        let c = cfg();
        let body = GenerateRequest::from_cfg(&c, "hi", Some("be brief"), Some(0.1));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["system"], "be brief");
        assert_eq!(json["stream"], false);
        assert!((json["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(json["options"]["num_predict"], 128);
        assert!(json["options"].get("top_p").is_none());
    }

    #[test]
    fn request_body_omits_missing_system() {
        let c = cfg();
        let body = GenerateRequest::from_cfg(&c, "hi", None, None);
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("system").is_none());
    }
}
