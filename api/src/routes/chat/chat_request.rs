use serde::{Deserialize, Serialize};

/// Request payload for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    /// Opaque client-chosen conversation key.
    pub session_id: String,
}

/// Response payload for `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}
