//! Webhook payload model (`object: "page"` events) and inbound extraction.
//!
//! Only the fields the bot reads are modeled; unknown fields are ignored and
//! missing collections default to empty.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagingEvent {
    #[serde(default)]
    pub sender: Option<Party>,
    #[serde(default)]
    pub recipient: Option<Party>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Page-scoped id of a user or of the page itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Set on copies of messages the page itself sent.
    #[serde(default)]
    pub is_echo: bool,
}

/// A user text message worth answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: String,
    pub text: String,
    pub mid: Option<String>,
}

/// Text messages with a sender, in delivery order. Echoes, attachments-only
/// messages and other event kinds (postbacks, reads) are skipped.
pub fn extract_messages(payload: &WebhookPayload) -> Vec<InboundMessage> {
    payload
        .entry
        .iter()
        .flat_map(|e| e.messaging.iter())
        .filter_map(|ev| {
            let sender = ev.sender.as_ref()?;
            let msg = ev.message.as_ref()?;
            if msg.is_echo {
                return None;
            }
            let text = msg.text.as_deref()?.trim();
            if text.is_empty() || sender.id.is_empty() {
                return None;
            }
            Some(InboundMessage {
                sender_id: sender.id.clone(),
                text: text.to_string(),
                mid: msg.mid.clone(),
            })
        })
        .collect()
}
