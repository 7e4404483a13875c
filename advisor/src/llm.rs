//! Answer generation with an explicit failure type and a fixed fallback.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::{ChatMessage, LlmServiceProfiles};
use tracing::info;

use crate::{error::GenerationFailure, prompt::Prompt};

/// Reply sent when no answer could be generated.
pub const FALLBACK_ANSWER: &str =
    "Xin lỗi anh/chị, hiện tại em chưa thể trả lời câu hỏi này. Anh/chị vui lòng thử lại sau ạ.";

/// Remote chat completion backend.
pub trait ChatModel: Send + Sync {
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationFailure>> + Send + 'a>>;
}

/// Chat profile of the shared LLM service (retries and timeout live there).
impl ChatModel for LlmServiceProfiles {
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationFailure>> + Send + 'a>> {
        Box::pin(async move {
            self.chat(messages)
                .await
                .map_err(|e| GenerationFailure::Remote(e.to_string()))
        })
    }
}

/// Text returned by the model for a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
}

#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// One model call, no retries beyond the remote client's own.
    pub async fn generate(&self, prompt: &Prompt) -> Result<Answer, GenerationFailure> {
        match prompt.question() {
            Some(q) if !q.trim().is_empty() => {}
            _ => return Err(GenerationFailure::EmptyPrompt),
        }

        let text = self.model.complete(&prompt.messages).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationFailure::EmptyAnswer);
        }
        info!(chars = text.chars().count(), "answer generated");
        Ok(Answer {
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::prompt::{PromptTemplate, Turn, compose};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted chat model that records calls and the last request.
    pub(crate) struct ScriptedModel {
        pub reply: Result<String, String>,
        pub calls: AtomicUsize,
        pub last: std::sync::Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedModel {
        pub(crate) fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.into()),
                calls: AtomicUsize::new(0),
                last: std::sync::Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(err: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err.into()),
                calls: AtomicUsize::new(0),
                last: std::sync::Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChatModel for ScriptedModel {
        fn complete<'a>(
            &'a self,
            messages: &'a [ChatMessage],
        ) -> Pin<Box<dyn Future<Output = Result<String, GenerationFailure>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = messages.to_vec();
            let reply = self.reply.clone().map_err(GenerationFailure::Remote);
            Box::pin(async move { reply })
        }
    }

    fn prompt(q: &str) -> Prompt {
        compose(&[], &[Turn::user(q)], &PromptTemplate::default())
    }

    #[tokio::test]
    async fn answer_is_trimmed() {
        let g = AnswerGenerator::new(ScriptedModel::ok("  Dạ, học phí là 300 triệu đồng ạ.\n"));
        let a = g.generate(&prompt("Học phí?")).await.unwrap();
        assert_eq!(a.text, "Dạ, học phí là 300 triệu đồng ạ.");
    }

    #[tokio::test]
    async fn remote_error_is_reported_once() {
        let model = ScriptedModel::failing("timed out");
        let g = AnswerGenerator::new(model.clone());
        assert!(matches!(
            g.generate(&prompt("Học phí?")).await,
            Err(GenerationFailure::Remote(msg)) if msg == "timed out"
        ));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn empty_question_never_reaches_the_model() {
        let model = ScriptedModel::ok("anything");
        let g = AnswerGenerator::new(model.clone());
        assert!(matches!(
            g.generate(&prompt("   ")).await,
            Err(GenerationFailure::EmptyPrompt)
        ));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn blank_answer_is_a_failure() {
        let g = AnswerGenerator::new(ScriptedModel::ok(" \n "));
        assert!(matches!(
            g.generate(&prompt("Học phí?")).await,
            Err(GenerationFailure::EmptyAnswer)
        ));
    }

    #[tokio::test]
    async fn llm_service_errors_are_remote_failures() {
        use ai_llm_service::{LlmModelConfig, LlmProvider};

        // Nothing listens on port 9; the transport error must not escape.
        let cfg = LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o".into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: Some("sk-test".into()),
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(2),
            max_retries: Some(0),
        };
        let svc = LlmServiceProfiles::new(cfg, None, Some(2)).unwrap();
        let g = AnswerGenerator::new(Arc::new(svc));
        assert!(matches!(
            g.generate(&prompt("Học phí?")).await,
            Err(GenerationFailure::Remote(_))
        ));
    }
}
