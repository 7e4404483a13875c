//! Embedding provider backed by the shared LLM service (remote embedding profile).

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::LlmServiceProfiles;

use crate::{EmbeddingsProvider, errors::EmbedError};

/// Calls `LlmServiceProfiles::embed`, OpenAI or Ollama depending on config.
#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    model: String,
}

impl LlmEmbedder {
    /// # Errors
    /// When `svc` has no remote embedding profile.
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Result<Self, EmbedError> {
        let model = svc
            .embedding_model()
            .ok_or_else(|| EmbedError("no remote embedding profile configured".into()))?
            .to_string();
        Ok(Self { svc, model })
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbedError>> + Send + 'a>> {
        Box::pin(async move {
            self.svc
                .embed(text)
                .await
                .map_err(|e| EmbedError(e.to_string()))
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
