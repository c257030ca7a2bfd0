//! Device endpoints.
//!
//! This module provides handlers for listing devices, reading one device and
//! applying state transitions.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use boneled_core::DeviceId;
use boneled_led::PIN_PROPERTY;
use boneled_runtime::{DeviceHost, DeviceQuery, DeviceView};

use crate::error::ApiError;
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query parameters for device listing.
#[derive(Debug, Default, Deserialize)]
pub struct DeviceFilter {
    /// Only devices of this type.
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    /// Only devices wired to this pin.
    #[serde(default)]
    pub pin: Option<String>,
}

impl DeviceFilter {
    /// Convert the filter into a registry query.
    #[must_use]
    pub fn into_query(self) -> DeviceQuery {
        let mut query = DeviceQuery::new();
        if let Some(device_type) = self.device_type {
            query = query.with_type(device_type);
        }
        if let Some(pin) = self.pin {
            query = query.with_property(PIN_PROPERTY, pin);
        }
        query
    }
}

/// Response for device list.
#[derive(Debug, Serialize)]
pub struct ListDevicesResponse {
    /// Matching devices, oldest first.
    pub devices: Vec<DeviceView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// List devices, optionally filtered by `type` and `pin`.
///
/// # Errors
///
/// Returns an error if the registry cannot be read.
pub async fn list_devices<H>(
    State(state): State<Arc<GatewayState<H>>>,
    Query(filter): Query<DeviceFilter>,
) -> Result<impl IntoResponse, ApiError>
where
    H: DeviceHost + 'static,
{
    let devices = state.host.list_devices(&filter.into_query()).await?;
    Ok(Json(ListDevicesResponse { devices }))
}

/// Get a single device.
///
/// # Errors
///
/// Returns `BadRequest` for a malformed ID and `NotFound` for an unknown one.
pub async fn get_device<H>(
    State(state): State<Arc<GatewayState<H>>>,
    Path(device_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: DeviceHost + 'static,
{
    let device_id = parse_device_id(&device_id)?;
    let device = state.host.get_device(&device_id).await?;
    Ok(Json(device))
}

/// Apply a transition, e.g. `POST /v1/devices/:device_id/transitions/turn-on`.
///
/// # Errors
///
/// Returns `NotFound` if the device is not live and `Conflict` if the
/// transition is not allowed from its current state.
pub async fn apply_transition<H>(
    State(state): State<Arc<GatewayState<H>>>,
    Path((device_id, transition)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError>
where
    H: DeviceHost + 'static,
{
    let device_id = parse_device_id(&device_id)?;
    let device = state.host.transition(&device_id, &transition).await?;
    Ok(Json(device))
}

/// Parse a device ID from a string.
fn parse_device_id(s: &str) -> Result<DeviceId, ApiError> {
    s.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid device ID: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_device_id() {
        let id = DeviceId::generate();
        assert_eq!(parse_device_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn parse_invalid_device_id() {
        let result = parse_device_id("P9_12");
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn filter_into_query() {
        let filter = DeviceFilter {
            device_type: Some("beaglebone_led".into()),
            pin: Some("P9_11".into()),
        };
        let query = filter.into_query();
        assert_eq!(query.device_type.as_deref(), Some("beaglebone_led"));
        assert_eq!(query.properties.get("pin").unwrap(), "P9_11");

        assert_eq!(DeviceFilter::default().into_query(), DeviceQuery::new());
    }
}
