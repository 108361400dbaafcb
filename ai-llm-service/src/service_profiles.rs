//! Shared LLM service with two profiles: `chat` and `embedding`.
//!
//! - Construct once, wrap in `Arc`, and pass clones to the answer engine and
//!   the knowledge base.
//! - HTTP clients are cached per config (provider+endpoint+model+key+timeout).
//! - Per-call overrides are limited to the system prompt and temperature.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{LlmModelConfig, LlmProvider, LlmServiceProfiles};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let chat = LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "mistral".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     api_key: None,
//!     max_tokens: None,
//!     temperature: Some(0.7),
//!     top_p: None,
//!     timeout_secs: Some(120),
//! };
//! let embedding = LlmModelConfig { model: "nomic-embed-text".into(), ..chat.clone() };
//!
//! let svc = Arc::new(LlmServiceProfiles::new(chat, embedding, Some(10))?);
//! let answer = svc.generate("What plans do you offer?", None, Some(0.7)).await?;
//! let vector = svc.embed("fiber internet").await?;
//! println!("{answer} / dim={}", vector.len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Shared service that owns the **chat** and **embedding** profiles.
pub struct LlmServiceProfiles {
    chat: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service.
    ///
    /// Clients are created lazily on first use, so a bad profile surfaces as
    /// an error from the first call rather than from here.
    pub fn new(
        chat: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            chat,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates text using the **chat** profile.
    ///
    /// `temperature = None` keeps the profile default.
    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<String, AiLlmError> {
        let cfg = &self.chat;
        debug!(provider = %cfg.provider, model = %cfg.model, "generate");
        match cfg.provider {
            LlmProvider::Ollama => {
                let cli = self.ollama_client(cfg).await?;
                cli.generate(prompt, system, temperature).await
            }
            LlmProvider::OpenAI => {
                let cli = self.openai_client(cfg).await?;
                cli.generate(prompt, system, temperature).await
            }
        }
    }

    /// Computes embeddings using the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let cfg = &self.embedding;
        match cfg.provider {
            LlmProvider::Ollama => self.ollama_client(cfg).await?.embeddings(input).await,
            LlmProvider::OpenAI => self.openai_client(cfg).await?.embeddings(input).await,
        }
    }

    /// Returns a health snapshot for the distinct profiles.
    ///
    /// When both profiles point at the same config it is probed once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.chat.clone()];
        if self.embedding != self.chat {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /* --------------------- Internals --------------------- */

    async fn ollama_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn openai_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OpenAiService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Cache key identifying one HTTP client configuration.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}
