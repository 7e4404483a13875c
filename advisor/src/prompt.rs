//! Prompt builder: fixed persona system message + context block + turns.

use ai_llm_service::ChatMessage;
use doc_store::ScoredSegment;
use tracing::debug;

use crate::error::AdvisorError;

pub use ai_llm_service::ChatRole as Role;

/// Default system instructions: persona, Vietnamese-only answers, MSE advising scope.
pub const SYSTEM_TEMPLATE: &str = "Sử dụng các thông tin sau đây để trả lời câu hỏi của người dùng.
Bạn là VyVy là một AI chatbox được tạo bởi nhóm của anh Bảo và anh Nam.
Xưng hô là em, đáp anh/chị
Hỗ trợ tư vấn học thạc sĩ của trường FSB Đại Học FPT
Tất cả câu trả lời của bạn đều phải trả lời bằng tiếng việt:

<context>
{context}
</context>";

const CONTEXT_SLOT: &str = "{context}";
const SEGMENT_SEPARATOR: &str = "\n\n";

/// One message of a running conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Full model input; the first message is the system instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub messages: Vec<ChatMessage>,
}

impl Prompt {
    /// Text of the newest user message, if any.
    pub fn question(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// System template with a `{context}` slot and an optional context budget.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
    max_context_chars: Option<usize>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: SYSTEM_TEMPLATE.to_string(),
            max_context_chars: None,
        }
    }
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>) -> Result<Self, AdvisorError> {
        let system = system.into();
        if !system.contains(CONTEXT_SLOT) {
            return Err(AdvisorError::TemplateWithoutContext);
        }
        Ok(Self {
            system,
            max_context_chars: None,
        })
    }

    /// Caps the context block; whole segments are dropped from the tail.
    pub fn with_context_budget(mut self, max_chars: Option<usize>) -> Self {
        self.max_context_chars = max_chars;
        self
    }

    fn render(&self, context: &str) -> String {
        self.system.replace(CONTEXT_SLOT, context)
    }
}

/// Builds the prompt: context segments inside the system message, then the
/// conversation in order (newest user turn last). Pure.
pub fn compose(context: &[ScoredSegment], conversation: &[Turn], template: &PromptTemplate) -> Prompt {
    let block = context_block(context, template.max_context_chars);

    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(ChatMessage::system(template.render(&block)));
    messages.extend(conversation.iter().map(|t| ChatMessage {
        role: t.role,
        content: t.text.clone(),
    }));
    Prompt { messages }
}

/// Joins segment texts verbatim, keeping retrieval order.
fn context_block(context: &[ScoredSegment], budget: Option<usize>) -> String {
    let mut out = String::new();
    let mut used = 0usize;

    for (i, hit) in context.iter().enumerate() {
        let text = hit.segment.text.as_str();
        let sep = if out.is_empty() { 0 } else { SEGMENT_SEPARATOR.len() };
        let cost = sep + text.chars().count();

        if let Some(max) = budget {
            if used + cost > max {
                debug!(kept = i, dropped = context.len() - i, max, "context budget reached");
                break;
            }
        }
        if sep > 0 {
            out.push_str(SEGMENT_SEPARATOR);
        }
        out.push_str(text);
        used += cost;
    }
    out
}
