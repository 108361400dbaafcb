//! Redis-backed conversation store.
//!
//! Each session is a Redis list at `<prefix><session_id>` whose elements are
//! JSON-encoded [`Turn`]s, appended with `RPUSH` and read with `LRANGE 0 -1`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::errors::HistoryError;
use crate::store::ConversationStore;
use crate::turn::Turn;

pub struct RedisConversationStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisConversationStore {
    /// Opens a managed (auto-reconnecting) connection to `url`.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self, HistoryError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
        })
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.key_prefix, session_id)
    }
}

#[async_trait]
impl ConversationStore for RedisConversationStore {
    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), HistoryError> {
        let payload = serde_json::to_string(&turn)?;
        let mut conn = self.conn.clone();
        redis::cmd("RPUSH")
            .arg(self.key(session_id))
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await?;
        Ok(())
    }

    async fn append_exchange(
        &self,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(), HistoryError> {
        let key = self.key(session_id);
        let user = serde_json::to_string(&Turn::user(user_text))?;
        let assistant = serde_json::to_string(&Turn::assistant(assistant_text))?;

        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(&key)
            .arg(user)
            .ignore()
            .cmd("RPUSH")
            .arg(&key)
            .arg(assistant)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        debug!(session_id, "exchange persisted");
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<Turn>, HistoryError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = redis::cmd("LRANGE")
            .arg(self.key(session_id))
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await?;

        raw.iter()
            .map(|s| serde_json::from_str::<Turn>(s).map_err(HistoryError::from))
            .collect()
    }

    async fn clear(&self, session_id: &str) -> Result<(), HistoryError> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(self.key(session_id))
            .query_async(&mut conn)
            .await?;

        if removed == 0 {
            return Err(HistoryError::NotFound(session_id.to_string()));
        }
        Ok(())
    }
}
