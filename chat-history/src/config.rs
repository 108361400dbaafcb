use std::sync::Arc;

use tracing::info;

use crate::errors::HistoryError;
use crate::memory_store::InMemoryConversationStore;
use crate::redis_store::RedisConversationStore;
use crate::store::ConversationStore;

pub const DEFAULT_KEY_PREFIX: &str = "message_store:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryBackend {
    Redis { url: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    pub key_prefix: String,
}

impl HistoryConfig {
    pub fn from_env() -> Result<Self, HistoryError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Reads `HISTORY_BACKEND` (`redis` | `memory`, default `redis`),
    /// `REDIS_URL` (required for redis) and `HISTORY_KEY_PREFIX`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HistoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("HISTORY_BACKEND")
            .unwrap_or_else(|| "redis".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "redis" => HistoryBackend::Redis {
                url: get("REDIS_URL").ok_or_else(|| {
                    HistoryError::Config("REDIS_URL is required for the redis backend".into())
                })?,
            },
            "memory" | "in-memory" => HistoryBackend::Memory,
            other => {
                return Err(HistoryError::Config(format!(
                    "unsupported HISTORY_BACKEND: {other}"
                )));
            }
        };

        Ok(Self {
            backend,
            key_prefix: get("HISTORY_KEY_PREFIX").unwrap_or_else(|| DEFAULT_KEY_PREFIX.into()),
        })
    }

    /// Builds the configured store.
    pub async fn build(&self) -> Result<Arc<dyn ConversationStore>, HistoryError> {
        match &self.backend {
            HistoryBackend::Redis { url } => {
                let store = RedisConversationStore::connect(url, self.key_prefix.clone()).await?;
                info!(prefix = %self.key_prefix, "using Redis conversation store");
                Ok(Arc::new(store))
            }
            HistoryBackend::Memory => {
                info!("using in-memory conversation store");
                Ok(Arc::new(InMemoryConversationStore::new()))
            }
        }
    }
}
