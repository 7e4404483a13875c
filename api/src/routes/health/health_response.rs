use ai_llm_service::HealthStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `true` when every probed provider answered.
    pub ok: bool,
    pub index: IndexSummary,
    pub providers: Vec<HealthStatus>,
}

#[derive(Debug, Serialize)]
pub struct IndexSummary {
    pub segments: usize,
    pub embedding_model: String,
    pub dim: usize,
    pub created_at: DateTime<Utc>,
}
