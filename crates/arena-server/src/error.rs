//! Error types for the HTTP server.

use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Per-request error, converted to a JSON response at the handler boundary.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Path cannot be mapped safely onto any mount.
    #[error("Malformed request path: {0}")]
    MalformedPath(String),

    /// Only safe methods are served.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    /// Unknown value for the `status` query parameter.
    #[error("Unknown tournament status: {0}")]
    InvalidStatus(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MalformedPath(path) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Malformed path", "path": path}),
            ),
            Self::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({"error": "Method not allowed", "method": method.as_str()}),
            ),
            Self::InvalidStatus(status) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Unknown tournament status", "status": status}),
            ),
            Self::Io(e) => {
                tracing::error!(error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal server error"}),
                )
            }
        };

        let mut response = (status, axum::Json(body)).into_response();
        if matches!(self, Self::MethodNotAllowed(_)) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
        }
        response
    }
}
