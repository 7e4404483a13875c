use crate::errors::EmbedError;
use std::{future::Future, pin::Pin};

/// Provider interface for embedding generation.
///
/// Async because real providers (OpenAI, Ollama) perform HTTP requests.
/// The same provider must serve the build and the query path: `model_id` is
/// stored in the index manifest and checked by the retriever.
pub trait EmbeddingsProvider: Send + Sync {
    /// Async embedding function.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbedError>> + Send + 'a>>;

    /// Identifier of the embedding model, part of the index version key.
    fn model_id(&self) -> &str;
}

pub mod llm;
pub mod minilm;
