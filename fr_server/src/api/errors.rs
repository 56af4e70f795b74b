//! API error rendering.
//!
//! Every failure is rendered as
//! `{"success": false, "error": {"code": ..., "message": ...}}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use fair_roulette::EngineError;
use serde_json::json;

/// Errors returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Engine rejected or failed the request
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Body could not be parsed as JSON
    #[error("Invalid JSON in request body")]
    InvalidJson(String),

    /// Body exceeded the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// No route for this method and path
    #[error("Route {method} {path} not found")]
    NotFound { method: Method, path: String },
}

impl ApiError {
    pub fn not_found(method: Method, uri: &Uri) -> Self {
        ApiError::NotFound {
            method,
            path: uri.path().to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Engine(err) => err.code(),
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::NotFound { .. } => "NOT_FOUND",
        }
    }

    /// Message safe to show to clients
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Engine(err) => err.client_message(),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidJson(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "Request failed: {}", self);
        } else {
            tracing::warn!(code = self.code(), detail = ?self, "Request rejected");
        }

        let body = json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": self.client_message(),
            }
        });

        (status, Json(body)).into_response()
    }
}
