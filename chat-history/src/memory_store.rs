use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::HistoryError;
use crate::store::ConversationStore;
use crate::turn::Turn;

/// Process-local store for development and tests. Lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), HistoryError> {
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn append_exchange(
        &self,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(), HistoryError> {
        let mut sessions = self.sessions.write().await;
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push(Turn::user(user_text));
        turns.push(Turn::assistant(assistant_text));
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<Turn>, HistoryError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn clear(&self, session_id: &str) -> Result<(), HistoryError> {
        match self.sessions.write().await.remove(session_id) {
            Some(turns) if !turns.is_empty() => Ok(()),
            _ => Err(HistoryError::NotFound(session_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Role;

    #[tokio::test]
    async fn exchange_is_appended_in_order() {
        let store = InMemoryConversationStore::new();
        store.append_exchange("s1", "plans?", "We have three.").await.unwrap();
        store.append("s1", Turn::user("thanks")).await.unwrap();

        let h = store.history("s1").await.unwrap();
        assert_eq!(h.len(), 3);
        assert_eq!(h[0], Turn::user("plans?"));
        assert_eq!(h[1].role, Role::Assistant);
        assert_eq!(h[2].text, "thanks");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemoryConversationStore::new();
        store.append_exchange("a", "q", "r").await.unwrap();
        assert!(store.history("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_session_then_reports_not_found() {
        let store = InMemoryConversationStore::new();
        store.append_exchange("s", "q", "r").await.unwrap();

        store.clear("s").await.unwrap();
        assert!(store.history("s").await.unwrap().is_empty());
        assert!(matches!(
            store.clear("s").await,
            Err(HistoryError::NotFound(id)) if id == "s"
        ));
    }
}
