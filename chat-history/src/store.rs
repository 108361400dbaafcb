use async_trait::async_trait;

use crate::errors::HistoryError;
use crate::turn::Turn;

/// Append-only, session-keyed turn log.
///
/// Sessions are created implicitly by the first append and only disappear
/// through [`ConversationStore::clear`].
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), HistoryError>;

    /// Appends a user turn followed by an assistant turn in one operation.
    async fn append_exchange(
        &self,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(), HistoryError>;

    /// All turns in arrival order; an unknown session yields an empty list.
    async fn history(&self, session_id: &str) -> Result<Vec<Turn>, HistoryError>;

    /// Removes the whole session.
    ///
    /// # Errors
    /// [`HistoryError::NotFound`] when the session has no turns.
    async fn clear(&self, session_id: &str) -> Result<(), HistoryError>;
}
