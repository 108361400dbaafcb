//! Data types flowing through ingestion and retrieval.

use serde::{Deserialize, Serialize};

/// A support document loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the documents directory, `/`-separated.
    pub source: String,
    pub text: String,
}

/// One overlapping piece of a [`Document`], the unit that gets embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable id: `<source>#<chunk_index>`.
    pub id: String,
    pub source: String,
    pub chunk_index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(source: &str, chunk_index: usize, text: String) -> Self {
        Self {
            id: format!("{source}#{chunk_index}"),
            source: source.to_string(),
            chunk_index,
            text,
        }
    }
}

/// A retrieved passage, ordered by descending similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    pub source: String,
    pub score: f32,
}

/// Summary statistics for a full reindex operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub files: usize,
    pub chunks: usize,
    pub indexed: usize,
    pub elapsed_ms: u128,
}
