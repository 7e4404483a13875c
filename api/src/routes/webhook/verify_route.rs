use std::sync::Arc;

use axum::extract::{Query, State};
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::webhook::verify_query::VerifyQuery,
};

/// Echoes `hub.challenge` when `hub.verify_token` matches the configured token.
///
/// `hub.mode` is accepted but not checked.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Query(q): Query<VerifyQuery>,
) -> AppResult<String> {
    if q.verify_token.as_deref() != Some(state.verify_token.as_str()) {
        warn!(mode = ?q.mode, "webhook verification rejected");
        return Err(AppError::Forbidden);
    }

    let challenge = q
        .challenge
        .ok_or_else(|| AppError::BadRequest("missing hub.challenge".into()))?;
    info!(mode = ?q.mode, "webhook verified");
    Ok(challenge)
}
