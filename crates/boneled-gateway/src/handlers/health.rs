//! Health and server information endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use boneled_runtime::DeviceHost;

use crate::state::GatewayState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Server information response.
#[derive(Debug, Serialize)]
pub struct ServerInfoResponse {
    /// Application name.
    pub name: String,
    /// Service version.
    pub version: &'static str,
    /// Number of live devices.
    pub devices: usize,
}

/// Health check handler.
///
/// # Example
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health() -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response))
}

/// Server information handler (`GET /`).
pub async fn server_info<H>(State(state): State<Arc<GatewayState<H>>>) -> impl IntoResponse
where
    H: DeviceHost + 'static,
{
    Json(ServerInfoResponse {
        name: state.host.name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        devices: state.host.device_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_returns_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
