//! Pin-level value types.

use serde::{Deserialize, Serialize};

/// Direction of a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinMode {
    /// Pin is read.
    #[serde(rename = "in")]
    Input,
    /// Pin is driven.
    #[serde(rename = "out")]
    Output,
}

/// Logical level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Level {
    /// Logical 0.
    Low = 0,
    /// Logical 1.
    High = 1,
}

impl Level {
    /// Convert the level to its numeric representation.
    #[must_use]
    pub const fn as_bit(self) -> u8 {
        self as u8
    }
}

impl From<Level> for gpiocdev::line::Value {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => Self::Inactive,
            Level::High => Self::Active,
        }
    }
}

/// Result of platform detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Board model, e.g. `TI AM335x BeagleBone Black`.
    pub name: String,
    /// Board serial number, when the firmware exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}
