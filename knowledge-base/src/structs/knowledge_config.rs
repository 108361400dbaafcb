//! Configuration layer: reads runtime settings from environment variables
//! and exposes strongly typed configs for Qdrant, ingestion, and search.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::knowledge_error::KnowledgeError;

/// Qdrant connectivity and collection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    /// gRPC URL for Qdrant (e.g., "http://localhost:6334").
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    /// Embedding vector dimensionality (768 for nomic-embed-text).
    pub dim: usize,
    /// Batch size for embed + upsert rounds.
    pub batch_size: usize,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            collection: "classic_vector_collection".to_string(),
            dim: 768,
            batch_size: 64,
        }
    }
}

/// Document ingestion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub documents_dir: PathBuf,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Rebuild the collection before the server starts listening.
    pub index_on_startup: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("documents"),
            chunk_size: 1000,
            chunk_overlap: 200,
            index_on_startup: true,
        }
    }
}

/// Top-level runtime configuration for the knowledge base.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    pub qdrant: QdrantConfig,
    pub ingest: IngestConfig,
    /// Optional minimum similarity score for search results.
    pub min_score: Option<f32>,
}

impl KnowledgeConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, KnowledgeError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build configuration through an arbitrary variable lookup.
    ///
    /// Variables used:
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default: "classic_vector_collection")
    /// - `EMBEDDING_DIM` (default: 768)
    /// - `QDRANT_BATCH_SIZE` (default: 64)
    /// - `DOCUMENTS_DIR` (default: "documents")
    /// - `CHUNK_SIZE` (default: 1000)
    /// - `CHUNK_OVERLAP` (default: 200)
    /// - `INDEX_ON_STARTUP` (default: true)
    /// - `RAG_MIN_SCORE` (optional)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, KnowledgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let qdrant = QdrantConfig {
            url: get("QDRANT_URL").unwrap_or(defaults.qdrant.url),
            api_key: get("QDRANT_API_KEY"),
            collection: get("QDRANT_COLLECTION").unwrap_or(defaults.qdrant.collection),
            dim: parse_or(&get, "EMBEDDING_DIM", defaults.qdrant.dim)?,
            batch_size: parse_or(&get, "QDRANT_BATCH_SIZE", defaults.qdrant.batch_size)?,
        };

        let ingest = IngestConfig {
            documents_dir: get("DOCUMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.ingest.documents_dir),
            chunk_size: parse_or(&get, "CHUNK_SIZE", defaults.ingest.chunk_size)?,
            chunk_overlap: parse_or(&get, "CHUNK_OVERLAP", defaults.ingest.chunk_overlap)?,
            index_on_startup: parse_or(&get, "INDEX_ON_STARTUP", defaults.ingest.index_on_startup)?,
        };

        let min_score = get("RAG_MIN_SCORE")
            .map(|v| {
                v.parse::<f32>().map_err(|_| KnowledgeError::EnvParse {
                    key: "RAG_MIN_SCORE".into(),
                    value: v,
                })
            })
            .transpose()?;

        // Basic validations
        if qdrant.dim == 0 {
            return Err(KnowledgeError::InvalidConfig("EMBEDDING_DIM must be > 0".into()));
        }
        if qdrant.batch_size == 0 {
            return Err(KnowledgeError::InvalidConfig(
                "QDRANT_BATCH_SIZE must be > 0".into(),
            ));
        }
        if ingest.chunk_overlap >= ingest.chunk_size {
            return Err(KnowledgeError::InvalidConfig(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                ingest.chunk_overlap, ingest.chunk_size
            )));
        }

        Ok(Self {
            qdrant,
            ingest,
            min_score,
        })
    }
}

/// Parse `key` as `T`, falling back to `default` when unset.
fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, KnowledgeError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(v) => v.parse::<T>().map_err(|_| KnowledgeError::EnvParse {
            key: key.into(),
            value: v,
        }),
        None => Ok(default),
    }
}
