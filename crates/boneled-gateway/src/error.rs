//! API and startup error types.
//!
//! [`ApiError`] defines the standard error format for all API responses.
//! [`BootstrapError`] covers everything that can stop the gateway from
//! starting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use boneled_runtime::RuntimeError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with the current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invalid request parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// The device hardware did not respond.
    #[error("hardware unavailable: {0}")]
    HardwareUnavailable(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HardwareUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal_error",
            Self::HardwareUnavailable(_) => "hardware_unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RuntimeError> for ApiError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::DeviceNotFound(id) => Self::NotFound(format!("device {id}")),
            RuntimeError::InvalidTransition { state, transition } => Self::Conflict(format!(
                "transition {transition:?} is not allowed from state {state:?}"
            )),
            RuntimeError::Hardware(hal_err) => {
                tracing::error!(error = %hal_err, "Hardware error");
                Self::HardwareUnavailable(hal_err.to_string())
            }
            RuntimeError::Store(store_err) => {
                tracing::error!(error = %store_err, "Store error");
                Self::Internal("storage error".to_string())
            }
            RuntimeError::InvalidMachine(msg) | RuntimeError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Self::Internal(msg)
            }
        }
    }
}

/// Errors that stop the gateway from starting.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configured pin label is malformed.
    #[error("invalid pin: {0}")]
    InvalidPin(#[from] boneled_core::IdError),

    /// The registry store could not be opened.
    #[error("storage error: {0}")]
    Store(#[from] boneled_store::StoreError),

    /// The device runtime failed to start.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use boneled_core::DeviceId;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            ApiError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("test".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::BadRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::HardwareUnavailable("test".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn runtime_errors_map_to_api_errors() {
        let err = ApiError::from(RuntimeError::DeviceNotFound(DeviceId::generate()));
        assert_eq!(err.code(), "not_found");

        let err = ApiError::from(RuntimeError::InvalidTransition {
            state: "on".into(),
            transition: "turn-on".into(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("turn-on"));

        let err = ApiError::from(RuntimeError::Store(
            boneled_store::StoreError::DeviceNotFound(DeviceId::generate()),
        ));
        assert_eq!(err.code(), "internal_error");
        assert_eq!(err.to_string(), "internal error: storage error");
    }
}
