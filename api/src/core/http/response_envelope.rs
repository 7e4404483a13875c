use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Status envelope shared by the webhook responses and errors:
/// `{"status": 200, "body": "EVENT_RECEIVED"}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEnvelope {
    pub status: u16,
    pub body: String,
}

impl StatusEnvelope {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            body: body.into(),
        }
    }

    /// Convert to axum Response with the same HTTP status.
    pub fn into_response_with_status(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for StatusEnvelope {
    fn into_response(self) -> Response {
        self.into_response_with_status()
    }
}
