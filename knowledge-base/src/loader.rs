//! Loads support documents (`.txt`, `.md`) from a directory tree.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::knowledge_error::KnowledgeError;
use crate::structs::document::Document;

const EXTENSIONS: &[&str] = &["txt", "md"];

/// Walks `dir` recursively and returns every non-empty text document,
/// ordered by relative path.
///
/// # Errors
/// - [`KnowledgeError::MissingDirectory`] if `dir` is not a directory
/// - [`KnowledgeError::Io`] if a matching file cannot be read as UTF-8
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, KnowledgeError> {
    if !dir.is_dir() {
        return Err(KnowledgeError::MissingDirectory(dir.to_path_buf()));
    }

    let mut docs = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_text_extension(entry.path()) {
            continue;
        }

        let path = entry.path();
        let text = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            debug!(path = %path.display(), "skipping empty document");
            continue;
        }

        docs.push(Document {
            source: relative_source(dir, path),
            text,
        });
    }

    docs.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(docs)
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn relative_source(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
