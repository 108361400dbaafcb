//! Typed error for the answer-engine crate.
//!
//! `Display` is the user-safe message; the internal cause is kept separately
//! for logs and never shown to clients.

use thiserror::Error;

pub const PROCESSING_MESSAGE: &str = "Error during RAG processing. Please try again later.";
pub const FALLBACK_MESSAGE: &str = "LLM fallback error. Please try again later.";

#[derive(Debug, Error)]
pub enum EngineError {
    /// Retrieval, history, grounded generation, or persistence failed.
    #[error("Error during RAG processing. Please try again later.")]
    Processing { cause: String },

    /// The general-knowledge fallback call failed.
    #[error("LLM fallback error. Please try again later.")]
    Fallback { cause: String },

    /// Invalid engine configuration (startup only).
    #[error("invalid engine configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub fn processing(cause: impl ToString) -> Self {
        EngineError::Processing {
            cause: cause.to_string(),
        }
    }

    pub fn fallback(cause: impl ToString) -> Self {
        EngineError::Fallback {
            cause: cause.to_string(),
        }
    }

    /// Internal cause for logging.
    pub fn cause(&self) -> &str {
        match self {
            EngineError::Processing { cause } | EngineError::Fallback { cause } => cause,
            EngineError::Config(msg) => msg,
        }
    }
}
