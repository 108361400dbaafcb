//! Hosted OpenAI-compatible backend for the chat and embedding profiles.
//!
//! - `POST {endpoint}/v1/chat/completions`: one non-streaming completion
//! - `POST {endpoint}/v1/embeddings`: one vector per call
//!
//! Requests carry `Authorization: Bearer <api_key>`.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, error, instrument};

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet};

#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_chat: String,
    url_embeddings: String,
}

impl OpenAiService {
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `OpenAI`
    /// - `MissingApiKey` if no key is configured
    /// - `InvalidEndpoint` if `cfg.endpoint` is not http/https
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::OpenAI {
            return Err(provider_err(ProviderErrorKind::InvalidProvider));
        }
        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| provider_err(ProviderErrorKind::MissingApiKey))?;

        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(provider_err(ProviderErrorKind::InvalidEndpoint(
                cfg.endpoint.clone(),
            )));
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| provider_err(ProviderErrorKind::Decode(format!("API key header: {e}"))))?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(60));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/');
        let url_chat = format!("{base}/v1/chat/completions");
        let url_embeddings = format!("{base}/v1/embeddings");

        Ok(Self {
            client,
            cfg,
            timeout,
            url_chat,
            url_embeddings,
        })
    }

    /// Returns the first choice's text. `temperature` overrides the profile
    /// default for this call only.
    ///
    /// # Errors
    /// `EmptyChoices` when the first choice is missing or has no text.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<String, AiLlmError> {
        let body = ChatRequest::from_cfg(&self.cfg, prompt, system, temperature);
        let out: ChatResponse = self.post(&self.url_chat, &body).await?;
        out.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| provider_err(ProviderErrorKind::EmptyChoices))
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input,
        };
        let out: EmbeddingsResponse = self.post(&self.url_embeddings, &body).await?;
        out.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| provider_err(ProviderErrorKind::Decode("empty `data` array".into())))
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, AiLlmError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            error!(%status, %url, %snippet, "openai returned non-success status");
            return Err(provider_err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet,
            })));
        }

        let out = resp
            .json::<R>()
            .await
            .map_err(|e| provider_err(ProviderErrorKind::Decode(e.to_string())))?;
        debug!(%url, latency_ms = started.elapsed().as_millis(), "openai call ok");
        Ok(out)
    }
}

fn provider_err(kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(LlmProvider::OpenAI, kind).into()
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatRequest<'a> {
    fn from_cfg(
        cfg: &'a LlmModelConfig,
        prompt: &'a str,
        system: Option<&'a str>,
        temperature: Option<f32>,
    ) -> Self {
        let messages = system
            .map(|content| Message {
                role: "system",
                content,
            })
            .into_iter()
            .chain([Message {
                role: "user",
                content: prompt,
            }])
            .collect();
        Self {
            model: &cfg.model,
            messages,
            temperature: temperature.or(cfg.temperature),
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".into(),
            endpoint: "https://api.openai.com/".into(),
            api_key: Some("sk-test".into()),
            max_tokens: Some(256),
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn rejects_foreign_provider_and_bad_endpoint() {
        let mut c = cfg();
        c.provider = LlmProvider::Ollama;
        assert!(OpenAiService::new(c).is_err());

        let mut c = cfg();
        c.endpoint = "api.openai.com".into();
        assert!(OpenAiService::new(c).is_err());
    }

    #[test]
    fn urls_drop_trailing_slash() {
        let svc = OpenAiService::new(cfg()).unwrap();
        assert_eq!(svc.url_chat, "https://api.openai.com/v1/chat/completions");
        assert_eq!(svc.url_embeddings, "https://api.openai.com/v1/embeddings");
    }

    #[test]
    fn system_message_comes_first_and_call_temperature_wins() {
        let c = cfg();
        let json =
            serde_json::to_value(ChatRequest::from_cfg(&c, "hi", Some("be brief"), Some(0.1)))
                .unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!((json["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(json["max_tokens"], 256);
        assert!(json.get("top_p").is_none());

        let json = serde_json::to_value(ChatRequest::from_cfg(&c, "hi", None, None)).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }
}
