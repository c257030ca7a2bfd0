//! Registry queries.
//!
//! A [`DeviceQuery`] is a conjunction of an optional device type and any
//! number of exact property matches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DeviceRecord;

/// Filter for looking up device records.
///
/// # Example
///
/// ```
/// use boneled_store::{DeviceQuery, DeviceRecord};
///
/// let query = DeviceQuery::new()
///     .with_type("beaglebone_led")
///     .with_property("pin", "P9_12");
///
/// let record = DeviceRecord::new("beaglebone_led", "off").with_property("pin", "P9_12");
/// assert!(query.matches(&record));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceQuery {
    /// Required device type, if any.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Properties that must match exactly.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl DeviceQuery {
    /// Create a query that matches every device.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the query to one device type.
    #[must_use]
    pub fn with_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    /// Require a property to have the given value.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns true if the record satisfies every condition of the query.
    #[must_use]
    pub fn matches(&self, record: &DeviceRecord) -> bool {
        if let Some(device_type) = &self.device_type {
            if record.device_type != *device_type {
                return false;
            }
        }

        self.properties
            .iter()
            .all(|(key, value)| record.property(key) == Some(value.as_str()))
    }
}
