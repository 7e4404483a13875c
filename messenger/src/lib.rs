//! Messenger Platform plumbing for the bot.
//!
//! - [`types`]: webhook payload model and [`extract_messages`]
//! - [`client`]: Send API client behind the [`MessageDelivery`] seam

pub mod client;
pub mod errors;
pub mod types;

pub use client::{MAX_TEXT_CHARS, MessageDelivery, MessengerClient, MessengerConfig, split_text};
pub use errors::{DeliveryFailure, MessengerConfigError};
pub use types::{InboundMessage, WebhookPayload, extract_messages};
