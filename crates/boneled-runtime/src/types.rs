//! Request, response and event types for the device runtime.

use std::collections::BTreeMap;

use boneled_core::DeviceId;
use boneled_store::DeviceRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::machine::DeviceInstance;

/// Default capacity of the device event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for the device server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Application name.
    pub name: String,
    /// Buffered events per subscriber before old events are dropped.
    pub event_capacity: usize,
}

impl ServerConfig {
    /// Create a configuration with the given application name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "boneled".to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// A device as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceView {
    /// Device ID.
    pub device_id: DeviceId,
    /// Device type.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current state.
    pub state: String,
    /// Device properties.
    pub properties: BTreeMap<String, String>,
    /// Transitions allowed from the current state. Empty when offline.
    pub transitions: Vec<String>,
    /// Whether a live instance is attached in this process.
    pub online: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DeviceView {
    /// View of a persisted record with no live instance.
    #[must_use]
    pub fn offline(record: DeviceRecord) -> Self {
        Self {
            device_id: record.device_id,
            device_type: record.device_type,
            name: record.name,
            state: record.state,
            properties: record.properties,
            transitions: Vec::new(),
            online: false,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// View of a persisted record overlaid with its live instance.
    #[must_use]
    pub fn live(record: DeviceRecord, device: &dyn DeviceInstance) -> Self {
        Self {
            state: device.state().to_string(),
            transitions: device.allowed_transitions(),
            online: true,
            ..Self::offline(record)
        }
    }
}

/// Events broadcast by the device server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// A new device was registered.
    Discovered {
        /// Device ID.
        device_id: DeviceId,
        /// Device type.
        device_type: String,
        /// Initial state.
        state: String,
        /// Device properties.
        properties: BTreeMap<String, String>,
    },
    /// A persisted device was reattached.
    Provisioned {
        /// Device ID.
        device_id: DeviceId,
        /// Device type.
        device_type: String,
        /// State after reattachment.
        state: String,
    },
    /// A transition was applied.
    Transitioned {
        /// Device ID.
        device_id: DeviceId,
        /// Transition name.
        transition: String,
        /// State before.
        from: String,
        /// State after.
        to: String,
    },
}

impl DeviceEvent {
    /// The device the event concerns.
    #[must_use]
    pub const fn device_id(&self) -> &DeviceId {
        match self {
            Self::Discovered { device_id, .. }
            | Self::Provisioned { device_id, .. }
            | Self::Transitioned { device_id, .. } => device_id,
        }
    }
}
