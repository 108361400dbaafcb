//! Thin HTTP client for the ClassyBot API.

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("Error: {detail}")]
    Http { status: StatusCode, detail: String },

    /// No usable response (connection refused, timeout, bad body).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One rendered history entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// `"user"` or `"bot"`.
    pub sender: String,
    pub message: String,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    query: &'a str,
    session_id: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

#[derive(Deserialize)]
struct MessagesReply {
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct ClearReply {
    message: String,
}

#[derive(Deserialize)]
struct ErrorReply {
    detail: String,
}

#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /chat`; returns the bot reply.
    pub async fn chat(&self, session_id: &str, query: &str) -> Result<String, ClientError> {
        let resp = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&ChatBody { query, session_id })
            .send()
            .await?;
        let reply: ChatReply = ok_or_detail(resp).await?.json().await?;
        Ok(reply.response)
    }

    /// `GET /messages`; stored history in order.
    pub async fn messages(&self, session_id: &str) -> Result<Vec<Message>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/messages", self.base_url))
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        let reply: MessagesReply = ok_or_detail(resp).await?.json().await?;
        Ok(reply.messages)
    }

    /// `DELETE /clear_messages`; returns the server's confirmation.
    pub async fn clear(&self, session_id: &str) -> Result<String, ClientError> {
        let resp = self
            .http
            .delete(format!("{}/clear_messages", self.base_url))
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        let reply: ClearReply = ok_or_detail(resp).await?.json().await?;
        Ok(reply.message)
    }
}

/// Passes 2xx through; otherwise extracts `detail` from the error body.
async fn ok_or_detail(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorReply>(&text)
        .map(|e| e.detail)
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text
            }
        });
    Err(ClientError::Http { status, detail })
}
