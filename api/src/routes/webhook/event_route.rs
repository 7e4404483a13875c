use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use messenger::{WebhookPayload, extract_messages};
use tracing::{debug, error, info, warn};

use crate::{
    core::{app_state::AppState, http::response_envelope::StatusEnvelope},
    error_handler::AppResult,
};

/// Handles a batch of webhook events.
///
/// Every inbound text message gets one answer, delivered before the response
/// is returned. Delivery failures are logged and do not change the status.
pub async fn event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> AppResult<StatusEnvelope> {
    let Json(payload) = payload.inspect_err(|e| warn!(error = %e, "malformed webhook body"))?;

    if payload.object.as_deref() != Some("page") {
        debug!(object = ?payload.object, "non-page webhook object");
    }

    let messages = extract_messages(&payload);
    info!(entries = payload.entry.len(), messages = messages.len(), "webhook event");

    for msg in messages {
        let reply = state.advisor.answer(&msg.sender_id, &msg.text).await;
        if let Err(e) = state.delivery.send_text(&msg.sender_id, &reply).await {
            error!(error = %e, sender = %msg.sender_id, mid = ?msg.mid, "reply delivery failed");
        }
    }

    Ok(StatusEnvelope::new(StatusCode::OK, "EVENT_RECEIVED"))
}
