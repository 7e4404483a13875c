//! Brochure-grounded answers for the Messenger bot.
//!
//! Public API: [`Advisor::answer`]. It retrieves top-K brochure segments,
//! composes the persona prompt (optionally with the sender's recent turns),
//! calls the chat model once and returns the answer, or a fixed Vietnamese
//! apology when anything on the way fails.

mod cfg;
mod error;
mod history;
mod llm;
mod prompt;

pub use cfg::AdvisorConfig;
pub use error::{AdvisorError, GenerationFailure};
pub use history::{ConversationStore, InMemoryHistory};
pub use llm::{Answer, AnswerGenerator, ChatModel, FALLBACK_ANSWER};
pub use prompt::{Prompt, PromptTemplate, Role, SYSTEM_TEMPLATE, Turn, compose};

use std::sync::Arc;

use doc_store::Retriever;
use tracing::{debug, info, instrument, warn};

/// Question-answering pipeline. Built once at startup, shared via `Arc`.
pub struct Advisor {
    retriever: Retriever,
    generator: AnswerGenerator,
    template: PromptTemplate,
    history: Option<Arc<dyn ConversationStore>>,
    cfg: AdvisorConfig,
}

impl Advisor {
    /// `history` is only consulted when `cfg.history_enabled` is set.
    pub fn new(
        retriever: Retriever,
        model: Arc<dyn ChatModel>,
        history: Option<Arc<dyn ConversationStore>>,
        cfg: AdvisorConfig,
    ) -> Self {
        let template = PromptTemplate::default().with_context_budget(cfg.max_context_chars);
        Self {
            retriever,
            generator: AnswerGenerator::new(model),
            template,
            history: history.filter(|_| cfg.history_enabled),
            cfg,
        }
    }

    /// Replaces the default persona template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template.with_context_budget(self.cfg.max_context_chars);
        self
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.cfg
    }

    /// Answers one message. Exactly one retrieval and one generation attempt;
    /// never fails.
    #[instrument(skip_all, fields(sender = %sender_id))]
    pub async fn answer(&self, sender_id: &str, question: &str) -> String {
        let context = match self.retriever.retrieve(question, self.cfg.top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "retrieval failed, answering without context");
                Vec::new()
            }
        };
        debug!(
            hits = context.len(),
            ordinals = ?context.iter().map(|h| h.segment.ordinal).collect::<Vec<_>>(),
            "context retrieved"
        );

        let mut conversation = match &self.history {
            Some(h) => h.recent(sender_id, self.cfg.history_turns).await,
            None => Vec::new(),
        };
        conversation.push(Turn::user(question));

        let prompt = compose(&context, &conversation, &self.template);
        let answer = match self.generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "generation failed, sending fallback");
                return FALLBACK_ANSWER.to_string();
            }
        };

        if let Some(h) = &self.history {
            h.append_exchange(sender_id, Turn::user(question), Turn::assistant(answer.text.clone()))
                .await;
        }
        info!(context = context.len(), "question answered");
        answer.text
    }
}
