//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`gridclip_core::Error`] so route
//! handlers can return `Result<T, AppError>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: gridclip_core::Error,
}

impl AppError {
    pub fn new(inner: gridclip_core::Error) -> Self {
        Self { inner }
    }
}

impl From<gridclip_core::Error> for AppError {
    fn from(e: gridclip_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let code = match &self.inner {
            gridclip_core::Error::NotFound { .. } => "not_found",
            gridclip_core::Error::Validation(_) => "validation_error",
            gridclip_core::Error::Database { .. } => "database_error",
            gridclip_core::Error::Io { .. } => "io_error",
            gridclip_core::Error::Rpc(_) => "rpc_error",
            gridclip_core::Error::Internal(_) => "internal_error",
        };

        let body = json!({
            "error": self.inner.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
