//! Remote language-model access shared by the bot.
//!
//! Two logical profiles are exposed through [`LlmServiceProfiles`]:
//! - **chat**: answers questions (OpenAI `/v1/chat/completions` or Ollama `/api/chat`)
//! - **embedding** (optional): turns text into vectors (OpenAI `/v1/embeddings` or Ollama
//!   `/api/embeddings`) when the in-process model is not used
//!
//! Construct once at startup, wrap in `Arc`, and hand clones to dependents.

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use chat::{ChatMessage, ChatRole};
pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use service_profiles::LlmServiceProfiles;
