//! Default model configs loaded from environment variables.
//!
//! Two roles are supported:
//!
//! - **Chat**      → answers the user (`temperature = 0` for stable replies)
//! - **Embedding** → vectors for the document index and the query path
//!
//! # Environment variables
//!
//! Chat (OpenAI):
//! - `OPENAI_API_KEY`   = bearer token (mandatory)
//! - `OPENAI_URL`       = API base, default `https://api.openai.com`
//! - `OPENAI_MODEL`     = chat model, default `gpt-4o`
//! - `LLM_MAX_TOKENS`   = optional response ceiling (u32)
//! - `LLM_TEMPERATURE`  = sampling temperature in `[0, 2]`, default 0
//! - `LLM_TIMEOUT_SECS` = optional request timeout, default 60
//! - `LLM_MAX_RETRIES`  = retry budget inside the client, default 2
//!
//! Embedding:
//! - `EMBEDDING_PROVIDER` = `fastembed` (default, in-process MiniLM), `openai` or `ollama`
//! - `EMBEDDING_MODEL`    = default `text-embedding-3-small` (OpenAI) or `all-minilm` (Ollama)
//! - `OLLAMA_URL` or `OLLAMA_PORT` = Ollama endpoint when the provider is `ollama`

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_f32, env_opt_u32, env_opt_u64, env_or, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "all-minilm";

/// Resolves the Ollama endpoint from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            validate_http_endpoint("OLLAMA_URL", &url)?;
            return Ok(url);
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            port.trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{}", port.trim()));
        }
    }
    Ok("http://localhost:11434".to_string())
}

fn openai_endpoint() -> Result<String, AiLlmError> {
    let url = env_or("OPENAI_URL", DEFAULT_OPENAI_URL);
    validate_http_endpoint("OPENAI_URL", &url)?;
    Ok(url)
}

/// Constructs the chat profile (OpenAI).
///
/// # Defaults
/// - `temperature = Some(0.0)` (`LLM_TEMPERATURE`)
/// - `timeout_secs = Some(60)`
/// - `max_retries = Some(2)`
pub fn config_openai_chat() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("OPENAI_API_KEY")?;
    let endpoint = openai_endpoint()?;
    let model = env_or("OPENAI_MODEL", DEFAULT_CHAT_MODEL);
    let temperature = env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(0.0);
    validate_range_f32("LLM_TEMPERATURE", temperature, 0.0, 2.0)?;

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(60)),
        max_retries: Some(env_opt_u32("LLM_MAX_RETRIES")?.unwrap_or(2)),
    })
}

/// `EMBEDDING_PROVIDER` value selecting the in-process embedding model.
pub const LOCAL_EMBEDDING_PROVIDER: &str = "fastembed";

/// Constructs the remote embedding profile.
///
/// Returns `Ok(None)` when `EMBEDDING_PROVIDER` selects the in-process model
/// (the default); the caller then embeds locally.
///
/// The model name chosen here is part of the document index version key:
/// changing it forces the index to be rebuilt at next startup.
pub fn config_embedding() -> Result<Option<LlmModelConfig>, AiLlmError> {
    let name = env_or("EMBEDDING_PROVIDER", LOCAL_EMBEDDING_PROVIDER);
    if name.trim().eq_ignore_ascii_case(LOCAL_EMBEDDING_PROVIDER) {
        return Ok(None);
    }
    let provider: LlmProvider = name.parse()?;

    let cfg = match provider {
        LlmProvider::OpenAI => LlmModelConfig {
            provider,
            model: env_or("EMBEDDING_MODEL", DEFAULT_OPENAI_EMBEDDING_MODEL),
            endpoint: openai_endpoint()?,
            api_key: Some(must_env("OPENAI_API_KEY")?),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(30),
            max_retries: Some(2),
        },
        LlmProvider::Ollama => LlmModelConfig {
            provider,
            model: env_or("EMBEDDING_MODEL", DEFAULT_OLLAMA_EMBEDDING_MODEL),
            endpoint: ollama_endpoint()?,
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(30),
            max_retries: Some(2),
        },
    };

    if cfg.model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }
    Ok(Some(cfg))
}
