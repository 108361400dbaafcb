//! Support-document knowledge base backed by Qdrant.
//!
//! Public API:
//! - [`KnowledgeIndex`]: top-k retrieval seam used by the answer engine.
//! - [`QdrantKnowledgeIndex`]: drop+create the collection, ingest a directory
//!   of `.txt`/`.md` files, and search it.

pub mod embedding;
pub mod errors;
pub mod loader;
pub mod splitter;
pub mod structs;
mod vector_db;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use tracing::{debug, info};

pub use embedding::EmbeddingProvider;
pub use errors::knowledge_error::KnowledgeError;
pub use structs::document::{Chunk, Document, IndexStats, Snippet};
pub use structs::knowledge_config::KnowledgeConfig;

use embedding::embed_all;
use loader::load_documents;
use splitter::DocumentSplitter;
use vector_db::{connect, reset_collection, search_top_k, upsert_batch};

/// Retrieval seam: the `k` most relevant snippets for a query.
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Snippet>, KnowledgeError>;
}

/// Knowledge index stored in a Qdrant collection.
pub struct QdrantKnowledgeIndex {
    client: Qdrant,
    cfg: KnowledgeConfig,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl QdrantKnowledgeIndex {
    /// Builds the gRPC client. No collection is touched.
    pub fn connect(
        cfg: KnowledgeConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, KnowledgeError> {
        let client = connect(&cfg.qdrant)?;
        Ok(Self {
            client,
            cfg,
            embedder,
        })
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.cfg
    }

    /// Rebuild the collection from `DOCUMENTS_DIR` (drop, create, ingest).
    pub async fn rebuild_from_directory(&self) -> Result<IndexStats, KnowledgeError> {
        let ingest = &self.cfg.ingest;
        info!(
            target: "knowledge_base::index",
            dir = %ingest.documents_dir.display(),
            collection = %self.cfg.qdrant.collection,
            "rebuild_from_directory: start"
        );
        let started = Instant::now();

        let splitter = DocumentSplitter::new(ingest.chunk_size, ingest.chunk_overlap)?;
        let docs = load_documents(&ingest.documents_dir)?;
        let chunks = splitter.split_documents(&docs);
        debug!(
            target: "knowledge_base::index",
            files = docs.len(),
            chunks = chunks.len(),
            "documents split"
        );

        reset_collection(&self.client, &self.cfg.qdrant).await?;

        let mut indexed = 0usize;
        for batch in chunks.chunks(self.cfg.qdrant.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let vectors = embed_all(self.embedder.as_ref(), &texts).await?;
            let points = batch.iter().zip(vectors).collect::<Vec<_>>();
            indexed += upsert_batch(&self.client, &self.cfg.qdrant, points).await?;
        }

        let stats = IndexStats {
            files: docs.len(),
            chunks: chunks.len(),
            indexed,
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!(
            target: "knowledge_base::index",
            files = stats.files,
            chunks = stats.chunks,
            indexed = stats.indexed,
            elapsed_ms = stats.elapsed_ms,
            "rebuild_from_directory: finished"
        );
        Ok(stats)
    }
}

#[async_trait]
impl KnowledgeIndex for QdrantKnowledgeIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Snippet>, KnowledgeError> {
        let vector = self.embedder.embed(query).await?;
        let hits = search_top_k(
            &self.client,
            &self.cfg.qdrant,
            vector,
            k,
            self.cfg.min_score,
        )
        .await?;
        debug!(
            target: "knowledge_base::search",
            k,
            hits = hits.len(),
            "search completed"
        );
        Ok(hits)
    }
}
