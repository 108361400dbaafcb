use serde::{Deserialize, Serialize};

use chat_history::{Role, Turn};

/// `?session_id=` query used by the history routes.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageItem>,
}

/// One chat bubble as the UI renders it.
#[derive(Debug, Serialize)]
pub struct MessageItem {
    /// `"user"` or `"bot"`.
    pub sender: &'static str,
    pub message: String,
}

impl From<Turn> for MessageItem {
    fn from(turn: Turn) -> Self {
        Self {
            sender: match turn.role {
                Role::User => "user",
                Role::Assistant => "bot",
            },
            message: turn.text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearMessagesResponse {
    pub message: String,
}
