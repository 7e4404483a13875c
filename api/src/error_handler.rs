use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use doc_store::{EmbedError, IndexError, StoreError};
use messenger::MessengerConfigError;
use thiserror::Error;

use crate::core::http::response_envelope::StatusEnvelope;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    /// Configuration (missing or invalid environment variables) and LLM setup.
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error("embedding model: {0}")]
    Embedding(#[from] EmbedError),

    #[error(transparent)]
    Messenger(#[from] MessengerConfigError),

    #[error("document store: {0}")]
    Store(#[from] StoreError),

    #[error("document index: {0}")]
    Index(#[from] IndexError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,

            // startup-only
            AppError::Llm(_)
            | AppError::Embedding(_)
            | AppError::Messenger(_)
            | AppError::Store(_)
            | AppError::Index(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        StatusEnvelope::new(status, self.to_string()).into_response_with_status()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Malformed or non-JSON webhook bodies become 400s.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}
