//! ClassyBot answer orchestration.
//!
//! Public API: [`AnswerEngine::answer`]. A query is first checked against
//! the canned small-talk table. Otherwise the session history and the top-k
//! support snippets are assembled into a grounded prompt; when the model
//! cannot answer from the documents, a localized general-knowledge prompt is
//! tried instead. Successful non-small-talk exchanges are persisted.

pub mod cfg;
pub mod engine;
pub mod error;
pub mod language;
pub mod llm;
pub mod prompt;
pub mod small_talk;

pub use cfg::EngineConfig;
pub use engine::{Answer, AnswerEngine, AnswerSource};
pub use error::EngineError;
pub use language::{Language, detect_language};
pub use llm::{GenerationRequest, LanguageModel};
pub use small_talk::{SmallTalkMatcher, SmallTalkPolicy};
