//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints. Completion-service failures carry their user-facing category
//! in `details` so clients can pick a message without parsing text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parla_chat::error::{ChatError, GatewayError};
use serde::Serialize;
use serde_json::json;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "quota_exceeded").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - empty text or unreadable body.
    BadRequest(String),
    /// 404 Not Found - unknown or expired session.
    NotFound(String),
    /// 409 Conflict - session busy or restarted mid-exchange.
    Conflict(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// Completion-service failure, mapped by kind.
    Gateway(GatewayError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Gateway(err) => match err {
                GatewayError::MissingCredentials => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "missing_credentials")
                }
                GatewayError::InvalidCredentials(_) => {
                    (StatusCode::UNAUTHORIZED, "invalid_credentials")
                }
                GatewayError::QuotaExceeded(_) => (StatusCode::TOO_MANY_REQUESTS, "quota_exceeded"),
                GatewayError::Billing(_) => (StatusCode::PAYMENT_REQUIRED, "billing"),
                GatewayError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "upstream_error"),
                GatewayError::Transport(_) => (StatusCode::BAD_GATEWAY, "transport_error"),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();

        let (message, details) = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => (msg, None),
            ApiError::Gateway(err) => {
                let category = err.category();
                let mut details = json!({
                    "category": category,
                    "userMessage": category.user_message(),
                });
                if let GatewayError::Upstream {
                    status: Some(upstream_status),
                    ..
                } = &err
                {
                    details["upstreamStatus"] = json!(upstream_status);
                }
                (err.to_string(), Some(details))
            }
        };

        if status.is_server_error() {
            tracing::warn!(
                status = status.as_u16(),
                error = error_code,
                detail = %message,
                "request failed"
            );
        }

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Gateway(e) => ApiError::Gateway(e),
            ChatError::InvalidInput(msg) => ApiError::BadRequest(msg),
            e @ ChatError::SessionNotFound(_) => ApiError::NotFound(e.to_string()),
            e @ (ChatError::SessionBusy(_) | ChatError::SessionRestarted(_)) => {
                ApiError::Conflict(e.to_string())
            }
            e @ (ChatError::Config(_) | ChatError::Internal(_)) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}
