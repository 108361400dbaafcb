//! Per-session conversation memory for ClassyBot.
//!
//! - [`ConversationStore`]: the store seam used by the engine and the API.
//! - [`RedisConversationStore`]: production backend, one Redis list per session.
//! - [`InMemoryConversationStore`]: process-local backend for development and tests.

pub mod config;
pub mod errors;
pub mod memory_store;
pub mod redis_store;
pub mod store;
pub mod turn;

pub use config::{HistoryBackend, HistoryConfig};
pub use errors::HistoryError;
pub use memory_store::InMemoryConversationStore;
pub use redis_store::RedisConversationStore;
pub use store::ConversationStore;
pub use turn::{Role, Turn};
