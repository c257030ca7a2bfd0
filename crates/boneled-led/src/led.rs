//! The LED device.
//!
//! ```text
//!        turn-on
//!   off ─────────▶ on
//!    ▲              │
//!    └──────────────┘
//!        turn-off
//! ```
//!
//! Every write to the pin goes through one of the two transitions. The
//! device trusts the host to only call a handler when the current state
//! allows it.

use std::fmt;
use std::sync::Arc;

use boneled_core::PinId;
use boneled_hal::{Level, PinIo, PinMode};
use boneled_runtime::{MachineConfig, Result, Transitionable};
use serde::{Deserialize, Serialize};

/// Device type registered for LEDs.
pub const LED_DEVICE_TYPE: &str = "beaglebone_led";

/// Transition that lights the LED.
pub const TURN_ON: &str = "turn-on";

/// Transition that darkens the LED.
pub const TURN_OFF: &str = "turn-off";

/// Record property holding the pin label.
pub const PIN_PROPERTY: &str = "pin";

/// Logical LED state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedState {
    /// Pin driven low.
    #[default]
    Off,
    /// Pin driven high.
    On,
}

impl LedState {
    /// State name as used in the state machine.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Pin level for this state.
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::Off => Level::Low,
            Self::On => Level::High,
        }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An LED wired to one BeagleBone pin.
pub struct LedDevice {
    pin: PinId,
    state: LedState,
    io: Arc<dyn PinIo>,
}

impl LedDevice {
    /// Create an LED on `pin`.
    #[must_use]
    pub fn new(pin: PinId, io: Arc<dyn PinIo>) -> Self {
        Self {
            pin,
            state: LedState::Off,
            io,
        }
    }

    /// Handler for `turn-on`.
    ///
    /// # Errors
    ///
    /// Never fails; pin write failures are logged.
    pub fn turn_on(&mut self) -> Result<()> {
        self.set(LedState::On);
        Ok(())
    }

    /// Handler for `turn-off`.
    ///
    /// # Errors
    ///
    /// Never fails; pin write failures are logged.
    pub fn turn_off(&mut self) -> Result<()> {
        self.set(LedState::Off);
        Ok(())
    }

    fn set(&mut self, state: LedState) {
        self.state = state;
        if let Err(e) = self.io.digital_write(&self.pin, state.level()) {
            tracing::error!(pin = %self.pin, state = %state, error = %e, "Failed to drive LED pin");
        }
    }
}

impl fmt::Debug for LedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedDevice")
            .field("pin", &self.pin)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Transitionable for LedDevice {
    fn init(&mut self, config: &mut MachineConfig<Self>) -> Result<()> {
        // Always start electrically off
        self.io.set_pin_mode(&self.pin, PinMode::Output)?;
        self.io.digital_write(&self.pin, Level::Low)?;
        self.state = LedState::Off;

        config
            .device_type(LED_DEVICE_TYPE)
            .state(LedState::Off.as_str())
            .name(self.pin.as_str())
            .when(LedState::Off.as_str(), &[TURN_ON])
            .when(LedState::On.as_str(), &[TURN_OFF])
            .map(TURN_OFF, Self::turn_off)
            .map(TURN_ON, Self::turn_on)
            .property(PIN_PROPERTY, self.pin.as_str());

        Ok(())
    }

    fn state(&self) -> &str {
        self.state.as_str()
    }
}
