//! HTTP error response conversion.
//!
//! Client mistakes come back as 400 with the reason. Everything else is a
//! 500 with a fixed message; the detail only goes to the operator log.

use crate::core::assistant::AssistantError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong on the backend.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper so `AssistantError` (a core type) can become an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AssistantError);

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = if self.0.is_client_error() {
            tracing::warn!("Rejected request: {}", self.0);
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            tracing::error!("Request failed: {}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_ERROR_MESSAGE.to_string(),
            )
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
