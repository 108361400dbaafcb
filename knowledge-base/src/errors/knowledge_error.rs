//! Unified error type for the knowledge-base crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while ingesting documents or querying the index.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O & filesystem ────────────────────────────────────────────────────
    /// The documents directory does not exist or is not a directory.
    #[error("documents directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// Underlying I/O error while reading a document.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Qdrant client / transport ───────────────────────────────────────────
    #[error("qdrant error: {0}")]
    Qdrant(String),

    // ── Embeddings backend ──────────────────────────────────────────────────
    #[error("embedding error: {0}")]
    Embedding(String),
}
