use std::sync::Arc;

use advisor::Advisor;
use ai_llm_service::{
    LlmServiceProfiles,
    error_handler::{env_or, must_env},
};
use doc_store::VectorIndex;
use messenger::MessageDelivery;

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Shared secret the platform echoes back during webhook verification.
    pub verify_token: String,
    /// Retrieval + generation pipeline.
    pub advisor: Arc<Advisor>,
    /// Outbound Send API.
    pub delivery: Arc<dyn MessageDelivery>,
    /// Built brochure index (read-only).
    pub index: Arc<VectorIndex>,
    /// Model profiles, probed by `/health`. `None` skips the probes.
    pub llm: Option<Arc<LlmServiceProfiles>>,
}

/// Listener and webhook settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_address: String,
    pub verify_token: String,
}

impl ServerConfig {
    /// `API_ADDRESS` (default `0.0.0.0:5000`), `VERIFY_TOKEN` (required).
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            api_address: env_or("API_ADDRESS", "0.0.0.0:5000"),
            verify_token: must_env("VERIFY_TOKEN")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{AiLlmError, error_handler::ConfigError};

    // Only test in this crate that mutates the process environment.
    #[test]
    fn verify_token_is_required() {
        let set = |k: &str, v: Option<&str>| unsafe {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        };
        set("API_ADDRESS", None);

        set("VERIFY_TOKEN", None);
        assert!(matches!(
            ServerConfig::from_env(),
            Err(AppError::Llm(AiLlmError::Config(ConfigError::MissingVar("VERIFY_TOKEN"))))
        ));

        set("VERIFY_TOKEN", Some("hub-secret"));
        let cfg = ServerConfig::from_env().unwrap();
        assert_eq!(cfg.api_address, "0.0.0.0:5000");
        assert_eq!(cfg.verify_token, "hub-secret");

        set("VERIFY_TOKEN", None);
    }
}
