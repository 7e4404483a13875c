//! Health probes for the remote model backends.
//!
//! - Ollama: `GET {endpoint}/api/tags`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth
//!
//! [`HealthService::check`] never fails: errors become `ok = false`, which is
//! what a `/health` endpoint wants.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// Serializable health snapshot for one profile.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Model listing shapes: Ollama `{models:[{name}]}`, OpenAI `{data:[{id}]}`.
#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<NamedModel>,
    #[serde(default)]
    data: Vec<NamedModel>,
}

#[derive(Deserialize)]
struct NamedModel {
    #[serde(alias = "id")]
    name: String,
}

/// Reuses a single HTTP client for all probes.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks one profile. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        let status = match self.probe(cfg).await {
            Ok((found, latency)) if found => {
                HealthStatus::new(cfg, true, latency, "reachable; model is available")
            }
            Ok((_, latency)) => {
                HealthStatus::new(cfg, false, latency, "reachable, but model is not listed")
            }
            Err(e) => HealthStatus::new(cfg, false, start.elapsed().as_millis(), e.to_string()),
        };

        if status.ok {
            info!(
                provider = %status.provider,
                model = %status.model,
                latency_ms = status.latency_ms,
                "health probe completed"
            );
        } else {
            warn!(
                provider = %status.provider,
                model = %status.model,
                message = %status.message,
                "health probe failed"
            );
        }
        status
    }

    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Lists models and reports whether `cfg.model` is among them.
    ///
    /// Ollama tags carry a `:latest` suffix, so a bare model name also matches.
    async fn probe(&self, cfg: &LlmModelConfig) -> Result<(bool, u128), AiLlmError> {
        let base = cfg.endpoint.trim().trim_end_matches('/');
        let url = match cfg.provider {
            LlmProvider::Ollama => format!("{base}/api/tags"),
            LlmProvider::OpenAI => format!("{base}/v1/models"),
        };
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout)
            .min(self.default_timeout);

        debug!(provider = ?cfg.provider, "GET {}", url);
        let started = Instant::now();

        let mut req = self.client.get(&url).timeout(timeout);
        if let Some(key) = &cfg.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;
        let latency = started.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })
            .into());
        }

        let list: ModelList = resp
            .json()
            .await
            .map_err(|e| HealthError::Decode(e.to_string()))?;

        let found = list.models.iter().chain(list.data.iter()).any(|m| {
            m.name == cfg.model || m.name.strip_suffix(":latest") == Some(cfg.model.as_str())
        });
        Ok((found, latency))
    }
}
