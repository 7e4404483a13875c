pub mod event_route;
pub mod verify_query;
pub mod verify_route;

use axum::http::StatusCode;

use crate::core::http::response_envelope::StatusEnvelope;

/// Any method other than GET/POST on `/webhook`.
pub async fn method_not_allowed() -> StatusEnvelope {
    StatusEnvelope::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
