//! Response shapes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use relay_shared::AppError;
use serde::Serialize;
use tracing::warn;

/// Message returned when the email was accepted by the transport.
pub const SENT_MESSAGE: &str = "Email sent successfully!";

/// Body of every `POST /send-email` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendEmailResponse {
    /// Whether the email was sent.
    pub success: bool,
    /// Confirmation or error description.
    pub message: String,
}

impl SendEmailResponse {
    /// Response for a sent email.
    #[must_use]
    pub fn sent() -> Self {
        Self {
            success: true,
            message: SENT_MESSAGE.to_string(),
        }
    }

    /// Response for a failed submission.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// 200 response for a sent email.
pub fn sent() -> Response {
    (StatusCode::OK, Json(SendEmailResponse::sent())).into_response()
}

/// Converts an error into the uniform failure response.
pub fn failure(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_client_error() {
        warn!(code = err.error_code(), error = %err, "Rejected contact form request");
    }
    (status, Json(SendEmailResponse::failed(err.message()))).into_response()
}
