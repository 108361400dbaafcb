//! Embedding boundary used by ingestion and search.

use async_trait::async_trait;

use ai_llm_service::LlmServiceProfiles;

use crate::errors::knowledge_error::KnowledgeError;

/// Turns text into a dense vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, KnowledgeError>;
}

#[async_trait]
impl EmbeddingProvider for LlmServiceProfiles {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, KnowledgeError> {
        LlmServiceProfiles::embed(self, text)
            .await
            .map_err(|e| KnowledgeError::Embedding(e.to_string()))
    }
}

/// Embeds `texts` one by one, preserving order.
pub async fn embed_all(
    embedder: &dyn EmbeddingProvider,
    texts: &[&str],
) -> Result<Vec<Vec<f32>>, KnowledgeError> {
    let mut out = Vec::with_capacity(texts.len());
    for t in texts {
        out.push(embedder.embed(t).await?);
    }
    Ok(out)
}
