//! Language-model seam for the engine.

use async_trait::async_trait;

use ai_llm_service::{AiLlmError, LlmServiceProfiles};

/// One non-streaming completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, AiLlmError>;
}

/// Routes through the chat profile, whichever provider it targets.
#[async_trait]
impl LanguageModel for LlmServiceProfiles {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, AiLlmError> {
        LlmServiceProfiles::generate(
            self,
            &req.prompt,
            req.system.as_deref(),
            Some(req.temperature),
        )
        .await
    }
}
