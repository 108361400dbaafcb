//! Request orchestration: small talk, grounded answer, fallback.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument};

use chat_history::ConversationStore;
use knowledge_base::KnowledgeIndex;

use crate::cfg::EngineConfig;
use crate::error::EngineError;
use crate::language::{Language, detect_language};
use crate::llm::{GenerationRequest, LanguageModel};
use crate::prompt::{SYSTEM_PROMPT, build_fallback_prompt, build_grounded_prompt, is_unhelpful};
use crate::small_talk::SmallTalkMatcher;

/// Which path produced the final reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    SmallTalk,
    Grounded,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

pub struct AnswerEngine {
    matcher: SmallTalkMatcher,
    store: Arc<dyn ConversationStore>,
    index: Arc<dyn KnowledgeIndex>,
    llm: Arc<dyn LanguageModel>,
    cfg: EngineConfig,
}

impl AnswerEngine {
    pub fn new(
        cfg: EngineConfig,
        store: Arc<dyn ConversationStore>,
        index: Arc<dyn KnowledgeIndex>,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            matcher: SmallTalkMatcher::with_default_table(cfg.small_talk),
            store,
            index,
            llm,
            cfg,
        }
    }

    /// Answers one query for a session.
    ///
    /// Small talk is answered from the canned table and not recorded. Every
    /// other successful answer is persisted as a (user, assistant) pair;
    /// failures persist nothing.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn answer(&self, query: &str, session_id: &str) -> Result<Answer, EngineError> {
        if let Some(reply) = self.matcher.detect(query) {
            info!(route = "small_talk", "answered from canned table");
            return Ok(Answer {
                text: reply.to_string(),
                source: AnswerSource::SmallTalk,
            });
        }

        let language = detect_language(query);

        let history = self.store.history(session_id).await.map_err(|e| {
            error!(error = %e, "history read failed");
            EngineError::processing(e)
        })?;

        let snippets = self.index.search(query, self.cfg.top_k).await.map_err(|e| {
            error!(error = %e, "knowledge search failed");
            EngineError::processing(e)
        })?;

        let prompt = build_grounded_prompt(
            query,
            &history,
            &snippets,
            self.cfg.history_window,
            self.cfg.max_ctx_chars,
        );
        debug!(prompt = %prompt, "grounded prompt");

        let grounded = self
            .llm
            .generate(&GenerationRequest {
                system: Some(SYSTEM_PROMPT.to_string()),
                prompt,
                temperature: self.cfg.grounded_temperature,
            })
            .await
            .map_err(|e| {
                error!(error = %e, "grounded generation failed");
                EngineError::processing(e)
            })?;
        debug!(answer = %grounded, "grounded answer");

        if !is_unhelpful(&grounded) {
            let text = grounded.trim().to_string();
            self.persist(session_id, query, &text).await?;
            info!(
                route = "grounded",
                language = language.code(),
                snippets = snippets.len(),
                history = history.len(),
                "answered from documents"
            );
            return Ok(Answer {
                text,
                source: AnswerSource::Grounded,
            });
        }

        let text = self.fallback(query, language).await?;
        self.persist(session_id, query, &text).await?;
        info!(
            route = "fallback",
            language = language.code(),
            snippets = snippets.len(),
            "answered from general knowledge"
        );
        Ok(Answer {
            text,
            source: AnswerSource::Fallback,
        })
    }

    async fn fallback(&self, query: &str, language: Language) -> Result<String, EngineError> {
        let prompt = build_fallback_prompt(query, language, &self.cfg.referral);
        debug!(prompt = %prompt, "fallback prompt");

        let out = self
            .llm
            .generate(&GenerationRequest {
                system: Some(SYSTEM_PROMPT.to_string()),
                prompt,
                temperature: self.cfg.fallback_temperature,
            })
            .await
            .map_err(|e| {
                error!(error = %e, "fallback generation failed");
                EngineError::fallback(e)
            })?;
        Ok(out.trim().to_string())
    }

    async fn persist(&self, session_id: &str, query: &str, answer: &str) -> Result<(), EngineError> {
        self.store
            .append_exchange(session_id, query, answer)
            .await
            .map_err(|e| {
                error!(error = %e, "history write failed");
                EngineError::processing(e)
            })
    }
}
