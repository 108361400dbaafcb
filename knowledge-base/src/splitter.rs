//! Chunking of loaded documents on top of the `text-splitter` crate.
//!
//! Markdown files go through [`MarkdownSplitter`] so headings and blocks stay
//! together; everything else uses the plain [`TextSplitter`]. Capacity and
//! overlap are measured in characters.

use text_splitter::{ChunkConfig, MarkdownSplitter, TextSplitter};

use crate::errors::knowledge_error::KnowledgeError;
use crate::structs::document::{Chunk, Document};

pub struct DocumentSplitter {
    text: TextSplitter<text_splitter::Characters>,
    markdown: MarkdownSplitter<text_splitter::Characters>,
}

impl DocumentSplitter {
    /// # Errors
    /// [`KnowledgeError::InvalidConfig`] when `chunk_size == 0` or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, KnowledgeError> {
        if chunk_size == 0 {
            return Err(KnowledgeError::InvalidConfig("chunk size must be > 0".into()));
        }
        let config = || {
            ChunkConfig::new(chunk_size)
                .with_overlap(chunk_overlap)
                .map_err(|e| {
                    KnowledgeError::InvalidConfig(format!(
                        "chunk overlap ({chunk_overlap}) vs size ({chunk_size}): {e}"
                    ))
                })
        };
        Ok(Self {
            text: TextSplitter::new(config()?),
            markdown: MarkdownSplitter::new(config()?),
        })
    }

    /// Plain-text chunks, trimmed and non-empty.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        collect(self.text.chunks(text))
    }

    pub fn split_markdown(&self, text: &str) -> Vec<String> {
        collect(self.markdown.chunks(text))
    }

    /// Splits every document and assigns `<source>#<index>` chunk ids.
    pub fn split_documents(&self, docs: &[Document]) -> Vec<Chunk> {
        docs.iter()
            .flat_map(|doc| {
                let pieces = if is_markdown(&doc.source) {
                    self.split_markdown(&doc.text)
                } else {
                    self.split_text(&doc.text)
                };
                pieces
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| Chunk::new(&doc.source, i, text))
            })
            .collect()
    }
}

fn collect<'a>(chunks: impl Iterator<Item = &'a str>) -> Vec<String> {
    chunks
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect()
}

fn is_markdown(source: &str) -> bool {
    source
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("md"))
}
