//! Shared LLM access layer for the ClassyBot backend.
//!
//! - [`config`]: provider enum, per-model configuration, env-driven defaults.
//! - [`services`]: thin HTTP clients for Ollama and OpenAI-compatible APIs.
//! - [`service_profiles`]: the `chat` + `embedding` profiles used by the app.
//! - [`health_service`]: resilient provider probes for `/health`.
//! - [`telemetry`]: `tracing` formatting layer and filters for the binary.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::AiLlmError;
pub use service_profiles::LlmServiceProfiles;
