use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::debug;

use crate::{
    core::app_state::AppState,
    routes::health::health_response::{HealthResponse, IndexSummary},
};

/// Index summary plus a reachability probe of the chat and embedding models.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let manifest = state.index.manifest();
    let index = IndexSummary {
        segments: state.index.count(),
        embedding_model: manifest.key.model.clone(),
        dim: state.index.dim(),
        created_at: manifest.created_at,
    };

    let providers = match &state.llm {
        Some(llm) => llm.health_all().await,
        None => Vec::new(),
    };
    let ok = providers.iter().all(|p| p.ok);
    debug!(ok, probes = providers.len(), "health checked");

    Json(HealthResponse {
        ok,
        index,
        providers,
    })
}
