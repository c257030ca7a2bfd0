//! Core identifier types for boneled.
//!
//! Devices are keyed by a random [`DeviceId`]; the hardware they drive is
//! named by a [`PinId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a pin label.
pub const MAX_PIN_LEN: usize = 32;

/// A 16-byte device identifier based on UUID v4.
///
/// Device IDs are assigned by the registry when a device is first discovered
/// and survive restarts through the persisted record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(uuid::Uuid);

impl DeviceId {
    /// Create a new `DeviceId` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Create a `DeviceId` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }

    /// Generate a new random `DeviceId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Return the bytes of the UUID.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl FromStr for DeviceId {
    type Err = IdError;

    /// Parse a `DeviceId` from a UUID string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0.to_string()
    }
}

impl AsRef<[u8]> for DeviceId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Label of a physical GPIO pin, such as `P9_12` or `USR0`.
///
/// The label is opaque to everything except the hardware layer, which maps
/// it to a concrete GPIO line. It is immutable once assigned to a device.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinId(String);

impl PinId {
    /// Create a `PinId`, validating the label.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is empty, longer than [`MAX_PIN_LEN`],
    /// or contains characters other than ASCII letters, digits, and `_`.
    pub fn new(label: impl Into<String>) -> Result<Self, IdError> {
        let label = label.into();
        if label.is_empty() {
            return Err(IdError::EmptyPin);
        }
        if label.len() > MAX_PIN_LEN {
            return Err(IdError::InvalidLength {
                max: MAX_PIN_LEN,
                got: label.len(),
            });
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(IdError::InvalidPin(label));
        }
        Ok(Self(label))
    }

    /// Return the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PinId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PinId({})", self.0)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PinId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PinId> for String {
    fn from(pin: PinId) -> Self {
        pin.0
    }
}

impl AsRef<str> for PinId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,

    /// The pin label is empty.
    #[error("pin label must not be empty")]
    EmptyPin,

    /// The pin label is too long.
    #[error("invalid length: at most {max} characters, got {got}")]
    InvalidLength {
        /// The maximum allowed length.
        max: usize,
        /// The actual length.
        got: usize,
    },

    /// The pin label contains unsupported characters.
    #[error("invalid pin label: {0}")]
    InvalidPin(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_roundtrip() {
        let id = DeviceId::generate();
        let str_repr = id.to_string();
        let parsed = DeviceId::from_str(&str_repr).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn device_id_invalid_uuid() {
        let result = DeviceId::from_str("not-a-uuid");
        assert!(matches!(result, Err(IdError::InvalidUuid)));
    }

    #[test]
    fn device_id_serde_json() {
        let id = DeviceId::from_bytes([7u8; 16]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: DeviceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn pin_id_accepts_header_labels() {
        for label in ["P9_12", "P8_46", "USR0", "gpio60"] {
            let pin = PinId::new(label).unwrap();
            assert_eq!(pin.as_str(), label);
            assert_eq!(pin.to_string(), label);
        }
    }

    #[test]
    fn pin_id_rejects_empty() {
        assert_eq!(PinId::new(""), Err(IdError::EmptyPin));
    }

    #[test]
    fn pin_id_rejects_bad_characters() {
        assert!(matches!(PinId::new("P9-12"), Err(IdError::InvalidPin(_))));
        assert!(matches!(PinId::new("P9 12"), Err(IdError::InvalidPin(_))));
    }

    #[test]
    fn pin_id_rejects_long_labels() {
        let label = "P".repeat(MAX_PIN_LEN + 1);
        assert!(matches!(
            PinId::new(label),
            Err(IdError::InvalidLength { max: MAX_PIN_LEN, .. })
        ));
    }

    #[test]
    fn pin_id_serde_json() {
        let pin = PinId::new("P9_11").unwrap();
        let json = serde_json::to_string(&pin).unwrap();
        assert_eq!(json, "\"P9_11\"");
        let parsed: PinId = serde_json::from_str(&json).unwrap();
        assert_eq!(pin, parsed);

        let bad: Result<PinId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
