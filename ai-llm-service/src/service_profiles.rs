//! Shared LLM service with a `chat` profile and an optional remote `embedding` profile.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Without an embedding profile, embeddings are computed in-process by the caller.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Clients are built eagerly, so a bad config fails at startup.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{ChatMessage, LlmServiceProfiles};
//! use ai_llm_service::config::default_config::{config_embedding, config_openai_chat};
//!
//! # async fn run() -> Result<(), ai_llm_service::AiLlmError> {
//! let svc = Arc::new(LlmServiceProfiles::new(config_openai_chat()?, config_embedding()?, Some(10))?);
//! let answer = svc.chat(&[ChatMessage::user("Xin chào")]).await?;
//! if svc.embedding_model().is_some() {
//!     let vector = svc.embed("Học phí của MSE?").await?;
//!     println!("{answer} / dim={}", vector.len());
//! }
//! # Ok(()) }
//! ```

use crate::{
    chat::ChatMessage,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError},
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Concrete provider client with enum dispatch.
enum ProviderClient {
    OpenAI(OpenAiService),
    Ollama(OllamaService),
}

impl ProviderClient {
    fn from_config(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::OpenAI => ProviderClient::OpenAI(OpenAiService::new(cfg)?),
            LlmProvider::Ollama => ProviderClient::Ollama(OllamaService::new(cfg)?),
        })
    }

    fn config(&self) -> &LlmModelConfig {
        match self {
            ProviderClient::OpenAI(c) => c.config(),
            ProviderClient::Ollama(c) => c.config(),
        }
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        match self {
            ProviderClient::OpenAI(c) => c.chat(messages).await,
            ProviderClient::Ollama(c) => c.chat(messages).await,
        }
    }

    async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self {
            ProviderClient::OpenAI(c) => c.embeddings(input).await,
            ProviderClient::Ollama(c) => c.embeddings(input).await,
        }
    }
}

/// Service that owns the **chat** profile and, optionally, a remote **embedding** profile.
pub struct LlmServiceProfiles {
    chat: ProviderClient,
    embedding: Option<ProviderClient>,
    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates the service and its HTTP clients.
    ///
    /// - `chat`: profile used to answer users.
    /// - `embedding`: remote profile for the document index and queries;
    ///   `None` when embeddings are computed in-process.
    /// - `health_timeout_secs`: optional timeout for health probes.
    pub fn new(
        chat: LlmModelConfig,
        embedding: Option<LlmModelConfig>,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            chat: ProviderClient::from_config(chat)?,
            embedding: embedding.map(ProviderClient::from_config).transpose()?,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Runs a chat completion with the **chat** profile.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        self.chat.chat(messages).await
    }

    /// Computes an embedding with the **embedding** profile.
    ///
    /// # Errors
    /// [`ConfigError::NoEmbeddingProfile`] when no remote profile is configured.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match &self.embedding {
            Some(client) => client.embed(input).await,
            None => Err(ConfigError::NoEmbeddingProfile.into()),
        }
    }

    /// Model identifier of the remote embedding profile, if any.
    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding.as_ref().map(|c| c.config().model.as_str())
    }

    /// Returns references to the current profiles `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, Option<&LlmModelConfig>) {
        (self.chat.config(), self.embedding.as_ref().map(ProviderClient::config))
    }

    /// Health snapshot for the remote profiles; identical configs are probed once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let (chat, embedding) = self.profiles();
        let mut list = vec![chat.clone()];
        if let Some(embedding) = embedding {
            if embedding.endpoint != chat.endpoint || embedding.model != chat.model {
                list.push(embedding.clone());
            }
        }
        self.health.check_many(&list).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::llm_provider::LlmProvider;

    fn ollama(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
            max_retries: Some(0),
        }
    }

    #[tokio::test]
    async fn embedding_without_remote_profile_is_a_config_error() {
        let svc = LlmServiceProfiles::new(ollama("qwen"), None, Some(1)).unwrap();
        assert!(svc.embedding_model().is_none());
        assert!(svc.profiles().1.is_none());
        assert!(matches!(
            svc.embed("Học phí?").await,
            Err(AiLlmError::Config(ConfigError::NoEmbeddingProfile))
        ));
    }

    #[test]
    fn remote_embedding_profile_exposes_its_model() {
        let svc =
            LlmServiceProfiles::new(ollama("qwen"), Some(ollama("all-minilm")), Some(1)).unwrap();
        assert_eq!(svc.embedding_model(), Some("all-minilm"));
    }
}
