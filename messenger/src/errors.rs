//! Crate-wide error types for messenger.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Sending a reply through the Send API failed. Logged, never retried.
#[derive(Debug, Error)]
pub enum DeliveryFailure {
    /// Transport failure (DNS, TLS, timeout...).
    #[error("send api transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the Graph API.
    #[error("send api returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Configuration problems (missing token, bad base URL).
#[derive(Debug, Error)]
pub enum MessengerConfigError {
    /// Missing or unparsable environment variable.
    #[error(transparent)]
    Env(#[from] AiLlmError),

    #[error("invalid {var}: {reason}")]
    Invalid {
        var: &'static str,
        reason: &'static str,
    },

    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
