use crate::config::llm_provider::LlmProvider;

/// Configuration for one model invocation profile.
///
/// # Fields
///
/// - `provider`: which backend to call.
/// - `model`: model identifier (`"gpt-4o"`, `"text-embedding-3-small"`, `"all-minilm"`).
/// - `endpoint`: base URL without the API path (`https://api.openai.com`).
/// - `api_key`: bearer token for providers that require one.
/// - `max_tokens`: response token ceiling, `None` lets the provider decide.
/// - `temperature`: sampling temperature; the bot uses `0.0`.
/// - `top_p`: nucleus sampling cutoff.
/// - `timeout_secs`: per-request timeout.
/// - `max_retries`: extra attempts after a retryable failure (transport, 429, 5xx).
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}
