//! Ollama service for chat and embeddings.
//!
//! - `POST {endpoint}/api/chat`       : non-streaming chat (`stream=false`)
//! - `POST {endpoint}/api/embeddings` : single embeddings vector
//!
//! Mostly used as the embedding backend (`all-minilm` is the
//! sentence-transformers `all-MiniLM-L6-v2` model), but chat works too.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    chat::ChatMessage,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
    },
    services::{base_url, with_retries},
};

/// Thin client for Ollama.
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `Ollama`
    /// - `InvalidEndpoint` if `cfg.endpoint` is not http(s)
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(Provider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let base = base_url(&cfg.endpoint).ok_or_else(|| {
            ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.unwrap_or(60)))
            .brotli(true)
            .build()?;

        info!(model = %cfg.model, endpoint = %cfg.endpoint, "OllamaService initialized");

        Ok(Self {
            client,
            url_chat: format!("{base}/api/chat"),
            url_embeddings: format!("{base}/api/embeddings"),
            cfg,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Non-streaming chat via `/api/chat`.
    ///
    /// Mapped options: `temperature`, `top_p`, `num_predict` ← `max_tokens`.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        let body = ChatRequest {
            model: &self.cfg.model,
            messages,
            stream: false,
            options: Options {
                temperature: self.cfg.temperature,
                top_p: self.cfg.top_p,
                num_predict: self.cfg.max_tokens,
            },
        };
        let retries = self.cfg.max_retries.unwrap_or(0);

        with_retries("ollama.chat", retries, || self.chat_once(&body)).await
    }

    async fn chat_once(&self, body: &ChatRequest<'_>) -> Result<String, AiLlmError> {
        debug!("POST {}", self.url_chat);
        let resp = self.client.post(&self.url_chat).json(body).send().await?;
        let resp = check_status(resp, &self.url_chat).await?;

        let out: ChatResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `message.content`")),
            )
        })?;

        let content = out
            .message
            .map(|m| m.content)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ProviderError::new(Provider::Ollama, ProviderErrorKind::EmptyChoices))?;
        Ok(content)
    }

    /// Retrieves embeddings via `/api/embeddings`.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };
        let retries = self.cfg.max_retries.unwrap_or(0);

        with_retries("ollama.embeddings", retries, || self.embeddings_once(&body)).await
    }

    async fn embeddings_once(&self, body: &EmbeddingsRequest<'_>) -> Result<Vec<f32>, AiLlmError> {
        debug!("POST {}", self.url_embeddings);
        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(body)
            .send()
            .await?;
        let resp = check_status(resp, &self.url_embeddings).await?;

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `{{ embedding: number[] }}`"
                )),
            )
        })?;

        if out.embedding.is_empty() {
            return Err(ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::Decode("empty embedding".into()),
            )
            .into());
        }
        Ok(out.embedding)
    }
}

async fn check_status(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, AiLlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    Err(ProviderError::new(
        Provider::Ollama,
        ProviderErrorKind::HttpStatus(HttpError {
            status,
            url: url.to_string(),
            snippet: make_snippet(&text),
        }),
    )
    .into())
}

/* ==========================
HTTP payloads
========================== */

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: Options,
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<OutMessage>,
}

#[derive(Debug, Deserialize)]
struct OutMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}
