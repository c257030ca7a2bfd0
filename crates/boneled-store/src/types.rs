//! Domain types stored in the database.

use std::collections::BTreeMap;

use boneled_core::DeviceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A device record stored in the registry.
///
/// Device-specific attributes (such as the pin an LED is wired to) live in
/// `properties` so that the registry stays agnostic of device kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Unique identifier for the device.
    pub device_id: DeviceId,
    /// Device type, e.g. `beaglebone_led`.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current state-machine state.
    pub state: String,
    /// Device-specific properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DeviceRecord {
    /// Create a fresh record with a newly generated ID.
    #[must_use]
    pub fn new(device_type: impl Into<String>, state: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            device_id: DeviceId::generate(),
            device_type: device_type.into(),
            name: None,
            state: state.into(),
            properties: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the record name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set a single property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a property value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}
