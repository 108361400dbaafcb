//! Health probes for LLM backends (Ollama, OpenAI).
//!
//! - Ollama: `GET {endpoint}/api/tags`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth
//!
//! Both probes also check that the configured model is listed. The returned
//! [`HealthStatus`] is JSON-serializable and is embedded in `GET /health`.
//! [`HealthService::check`] never fails; errors become `ok = false`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for a single profile.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (`"Ollama"` or `"OpenAI"`).
    pub provider: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub ok: bool,
    /// Latency of the probe request in milliseconds.
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: cfg.provider.to_string(),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker that reuses a single HTTP client across probes.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds, default 10).
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks one profile, mapping every failure to `ok = false`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            warn!(provider = %cfg.provider, endpoint = %cfg.endpoint, "invalid endpoint");
            return HealthStatus::new(cfg, false, 0, "endpoint is empty or missing http/https");
        }

        let start = Instant::now();
        let status = match self.probe(cfg).await {
            Ok(listed) => {
                let latency = start.elapsed().as_millis();
                match listed {
                    Some(true) | None => HealthStatus::new(
                        cfg,
                        true,
                        latency,
                        format!("{} is healthy; model is available", cfg.provider),
                    ),
                    Some(false) => HealthStatus::new(
                        cfg,
                        false,
                        latency,
                        format!("{} is up, but model `{}` is not listed", cfg.provider, cfg.model),
                    ),
                }
            }
            Err(err) => HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string()),
        };

        if status.ok {
            info!(
                provider = %status.provider,
                model = %cfg.model,
                latency_ms = status.latency_ms,
                "health probe completed"
            );
        } else {
            warn!(
                provider = %status.provider,
                model = %cfg.model,
                latency_ms = status.latency_ms,
                message = %status.message,
                "health probe failed"
            );
        }
        status
    }

    /// Checks several profiles sequentially.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Runs the provider probe.
    ///
    /// Returns whether the model is listed, or `None` when the listing could
    /// not be decoded (server reachable, listing unknown).
    async fn probe(&self, cfg: &LlmModelConfig) -> Result<Option<bool>, AiLlmError> {
        let base = cfg.endpoint.trim_end_matches('/');
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let request = match cfg.provider {
            LlmProvider::Ollama => self.client.get(format!("{base}/api/tags")),
            LlmProvider::OpenAI => {
                let key = cfg.api_key.as_deref().ok_or_else(|| {
                    HealthError::Decode("missing OpenAI API key".into())
                })?;
                let auth = header::HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;
                self.client
                    .get(format!("{base}/v1/models"))
                    .header(header::AUTHORIZATION, auth)
            }
        };

        let resp = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = resp.url().to_string();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })
            .into());
        }

        let listed = match cfg.provider {
            LlmProvider::Ollama => resp
                .json::<OllamaTags>()
                .await
                .ok()
                .map(|t| t.models.iter().any(|m| model_matches(&m.name, &cfg.model))),
            LlmProvider::OpenAI => resp
                .json::<OpenAiModels>()
                .await
                .ok()
                .map(|m| m.data.iter().any(|m| m.id == cfg.model)),
        };
        Ok(listed)
    }
}

/// Ollama reports `mistral:latest` for a model configured as `mistral`.
fn model_matches(listed: &str, configured: &str) -> bool {
    listed == configured
        || (!configured.contains(':') && listed.strip_suffix(":latest") == Some(configured))
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Deserialize)]
struct OllamaTag {
    name: String,
}

#[derive(Deserialize)]
struct OpenAiModels {
    data: Vec<OpenAiModel>,
}

#[derive(Deserialize)]
struct OpenAiModel {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_tag_matches_bare_model_name() {
        assert!(model_matches("mistral:latest", "mistral"));
        assert!(model_matches("mistral:7b", "mistral:7b"));
        assert!(!model_matches("mistral:7b", "mistral"));
        assert!(!model_matches("llama3:latest", "mistral"));
    }
}
