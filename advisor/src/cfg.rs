//! Runtime configuration loaded from environment variables.

use ai_llm_service::AiLlmError;
use ai_llm_service::error_handler::{env_opt_bool, env_opt_usize, validate_positive};

/// Knobs of the question-answering pipeline. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// Segments retrieved per question.
    pub top_k: usize,
    /// Include previous turns of the same sender in the prompt.
    pub history_enabled: bool,
    /// Maximum number of previous turns to include.
    pub history_turns: usize,
    /// Context budget in characters; `None` keeps every retrieved segment.
    pub max_context_chars: Option<usize>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            history_enabled: false,
            history_turns: 10,
            max_context_chars: None,
        }
    }
}

impl AdvisorConfig {
    /// Build from environment variables with defaults.
    ///
    /// - `RAG_TOP_K` (2, at least 1)
    /// - `HISTORY_ENABLED` (`false`)
    /// - `HISTORY_TURNS` (10)
    /// - `MAX_CONTEXT_CHARS` (unset)
    ///
    /// # Errors
    /// Values that do not parse, and a `RAG_TOP_K` of 0.
    pub fn from_env() -> Result<Self, AiLlmError> {
        let d = Self::default();
        let top_k = env_opt_usize("RAG_TOP_K")?.unwrap_or(d.top_k);
        Ok(Self {
            top_k: validate_positive("RAG_TOP_K", top_k)?,
            history_enabled: env_opt_bool("HISTORY_ENABLED")?.unwrap_or(d.history_enabled),
            history_turns: env_opt_usize("HISTORY_TURNS")?.unwrap_or(d.history_turns),
            max_context_chars: env_opt_usize("MAX_CONTEXT_CHARS")?,
        })
    }
}
