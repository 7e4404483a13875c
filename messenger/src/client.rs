//! Send API client (Graph API `POST /me/messages`).

use std::{future::Future, pin::Pin, time::Duration};

use ai_llm_service::error_handler::{env_opt_u64, env_or, must_env};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    errors::{DeliveryFailure, MessengerConfigError},
    types::Party,
};

/// Platform limit for a single text message, in characters.
pub const MAX_TEXT_CHARS: usize = 2000;

const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v12.0";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Outbound delivery seam used by the HTTP layer.
pub trait MessageDelivery: Send + Sync {
    /// Sends `text` to `recipient_id`, split into several messages if needed.
    fn send_text<'a>(
        &'a self,
        recipient_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryFailure>> + Send + 'a>>;
}

#[derive(Debug, Clone)]
pub struct MessengerConfig {
    /// e.g. `https://graph.facebook.com/v12.0`
    pub graph_api_base: String,
    pub page_access_token: String,
    pub timeout_secs: u64,
}

impl MessengerConfig {
    /// `PAGE_ACCESS_TOKEN` (required), `GRAPH_API_BASE` (optional),
    /// `MESSENGER_TIMEOUT_SECS` (15).
    pub fn from_env() -> Result<Self, MessengerConfigError> {
        Ok(Self {
            graph_api_base: env_or("GRAPH_API_BASE", DEFAULT_GRAPH_API_BASE),
            page_access_token: must_env("PAGE_ACCESS_TOKEN")?,
            timeout_secs: env_opt_u64("MESSENGER_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    recipient: Party,
    message: OutText<'a>,
}

#[derive(Serialize)]
struct OutText<'a> {
    text: &'a str,
}

/// Graph API client with a shared HTTP instance and page token.
#[derive(Debug, Clone)]
pub struct MessengerClient {
    http: Client,
    url: String,
    token: String,
}

impl MessengerClient {
    pub fn new(cfg: MessengerConfig) -> Result<Self, MessengerConfigError> {
        let base = cfg.graph_api_base.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(MessengerConfigError::Invalid {
                var: "GRAPH_API_BASE",
                reason: "must start with http:// or https://",
            });
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        debug!("Creating MessengerClient with base={}", base);

        Ok(Self {
            http,
            url: format!("{base}/me/messages"),
            token: cfg.page_access_token,
        })
    }

    /// Posts one message part.
    async fn send_part(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryFailure> {
        let body = SendRequest {
            recipient: Party {
                id: recipient_id.to_string(),
            },
            message: OutText { text },
        };

        let resp = self
            .http
            .post(&self.url)
            .query(&[("access_token", self.token.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), recipient = recipient_id, "Send API rejected message");
            return Err(DeliveryFailure::Status {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }
        Ok(())
    }
}

impl MessageDelivery for MessengerClient {
    fn send_text<'a>(
        &'a self,
        recipient_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryFailure>> + Send + 'a>> {
        Box::pin(async move {
            let parts = split_text(text, MAX_TEXT_CHARS);
            for part in &parts {
                self.send_part(recipient_id, part).await?;
            }
            info!(recipient = recipient_id, parts = parts.len(), "reply delivered");
            Ok(())
        })
    }
}

/// Splits `text` into parts of at most `max` characters.
///
/// Prefers to cut after the last whitespace in the second half of a window so
/// words stay whole; falls back to a hard cut on a char boundary.
pub fn split_text(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.trim().chars().collect();
    let mut parts = Vec::new();
    let max = max.max(1);
    let mut start = 0usize;

    while start < chars.len() {
        let hard_end = (start + max).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            chars[start + max / 2..hard_end]
                .iter()
                .rposition(|c| c.is_whitespace())
                .map(|p| start + max / 2 + p + 1)
                .unwrap_or(hard_end)
        };

        let part: String = chars[start..end].iter().collect();
        let part = part.trim();
        if !part.is_empty() {
            parts.push(part.to_string());
        }
        start = end;
    }
    parts
}
