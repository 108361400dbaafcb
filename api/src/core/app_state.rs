use std::sync::Arc;

use tracing::info;

use ai_llm_service::{
    LlmServiceProfiles,
    config::default_config::{config_chat, config_embedding},
};
use answer_engine::{AnswerEngine, EngineConfig};
use chat_history::{ConversationStore, HistoryConfig};
use knowledge_base::{KnowledgeConfig, QdrantKnowledgeIndex};

use crate::error_handler::AppError;

/// Timeout for `/health` provider probes.
const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnswerEngine>,
    /// Same store the engine writes to; read and cleared by the history routes.
    pub store: Arc<dyn ConversationStore>,
    /// LLM profiles, probed by `/health`.
    pub llm: Arc<LlmServiceProfiles>,
}

impl AppState {
    pub fn new(
        engine: Arc<AnswerEngine>,
        store: Arc<dyn ConversationStore>,
        llm: Arc<LlmServiceProfiles>,
    ) -> Self {
        Self { engine, store, llm }
    }

    /// Builds every component from environment variables.
    ///
    /// Rebuilds the knowledge index first when `INDEX_ON_STARTUP` is set, so
    /// the server never answers from a half-built collection.
    pub async fn from_env() -> Result<Self, AppError> {
        let chat = config_chat().map_err(AppError::startup)?;
        let embedding = config_embedding().map_err(AppError::startup)?;
        info!(
            chat_provider = %chat.provider,
            chat_model = %chat.model,
            embedding_model = %embedding.model,
            "LLM profiles loaded"
        );
        let llm = Arc::new(
            LlmServiceProfiles::new(chat, embedding, Some(HEALTH_TIMEOUT_SECS))
                .map_err(AppError::startup)?,
        );

        let kb_cfg = KnowledgeConfig::from_env().map_err(AppError::startup)?;
        let index = QdrantKnowledgeIndex::connect(kb_cfg, llm.clone()).map_err(AppError::startup)?;
        if index.config().ingest.index_on_startup {
            let stats = index
                .rebuild_from_directory()
                .await
                .map_err(AppError::startup)?;
            info!(
                files = stats.files,
                chunks = stats.chunks,
                indexed = stats.indexed,
                elapsed_ms = stats.elapsed_ms as u64,
                "knowledge index rebuilt"
            );
        } else {
            info!("INDEX_ON_STARTUP disabled; using existing collection");
        }

        let store = HistoryConfig::from_env()
            .map_err(AppError::startup)?
            .build()
            .await
            .map_err(AppError::startup)?;

        let engine_cfg = EngineConfig::from_env().map_err(AppError::startup)?;
        info!(
            top_k = engine_cfg.top_k,
            history_window = engine_cfg.history_window,
            small_talk = ?engine_cfg.small_talk,
            "answer engine configured"
        );
        let engine = AnswerEngine::new(engine_cfg, store.clone(), Arc::new(index), llm.clone());

        Ok(Self::new(Arc::new(engine), store, llm))
    }
}
