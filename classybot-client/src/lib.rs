//! Terminal client for the ClassyBot chat API.

pub mod api_client;
pub mod render;

pub use api_client::{ChatClient, ClientError, Message};
pub use render::{Command, Speaker};
