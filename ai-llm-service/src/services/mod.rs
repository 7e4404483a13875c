pub mod ollama_service;
pub mod open_ai_service;

use std::{future::Future, time::Duration};

use tracing::warn;

use crate::error_handler::AiLlmError;

/// Runs `call` once plus up to `max_retries` more times while the error is retryable.
///
/// Backoff doubles from 250 ms between attempts.
pub(crate) async fn with_retries<T, F, Fut>(
    op: &'static str,
    max_retries: u32,
    mut call: F,
) -> Result<T, AiLlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AiLlmError>>,
{
    let mut attempt = 0u32;
    loop {
        match call().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                let backoff = Duration::from_millis(250u64 << attempt.min(5));
                warn!(
                    op,
                    attempt = attempt + 1,
                    max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "retryable failure, backing off"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Validates and normalizes a provider base URL (no trailing slash).
pub(crate) fn base_url(endpoint: &str) -> Option<String> {
    let endpoint = endpoint.trim();
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Some(endpoint.trim_end_matches('/').to_string())
    } else {
        None
    }
}
