//! Typed errors for the advisor crate.

use thiserror::Error;

/// The model call did not produce a usable answer.
///
/// Never shown to the user: callers map it to the fixed fallback text.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// Prompt has no non-empty user turn.
    #[error("prompt contains no user question")]
    EmptyPrompt,

    /// Transport, timeout, non-2xx or undecodable response from the model API.
    #[error("model call failed: {0}")]
    Remote(String),

    /// The model answered with blank text.
    #[error("model returned an empty answer")]
    EmptyAnswer,
}

#[derive(Debug, Error)]
pub enum AdvisorError {
    /// A custom system template lacks the `{context}` placeholder.
    #[error("system template must contain the {{context}} placeholder")]
    TemplateWithoutContext,
}
