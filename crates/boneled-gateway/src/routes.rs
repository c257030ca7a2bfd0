//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use boneled_runtime::DeviceHost;

use crate::handlers::{devices, events, health};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `GET /` - Server name and device count
/// - `GET /v1/devices` - List devices (`?type=` and `?pin=` filters)
/// - `GET /v1/devices/:device_id` - Get device
/// - `POST /v1/devices/:device_id/transitions/:transition` - Apply transition
/// - `GET /v1/events/ws` - WebSocket device event stream
pub fn create_router<H>(state: GatewayState<H>) -> Router
where
    H: DeviceHost + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health))
        .route("/", get(health::server_info::<H>))
        // Devices
        .route("/v1/devices", get(devices::list_devices::<H>))
        .route("/v1/devices/:device_id", get(devices::get_device::<H>))
        .route(
            "/v1/devices/:device_id/transitions/:transition",
            post(devices::apply_transition::<H>),
        )
        // Events
        .route("/v1/events/ws", get(events::events_handler::<H>))
        // Middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

/// Build the CORS layer from configured origins.
///
/// `*` allows any origin; an empty list allows none.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
