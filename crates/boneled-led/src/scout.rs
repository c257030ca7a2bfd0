//! LED discovery.
//!
//! Once the board reports that platform detection is done, the scout looks
//! up each configured pin in the registry. A pin with an existing record is
//! provisioned onto the oldest match; a pin without one is discovered as a
//! new device. Pins are handled by independent tasks, and `init` returns as
//! soon as discovery has been dispatched.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use boneled_core::{DeviceId, PinId};
use boneled_hal::PinIo;
use boneled_runtime::{DeviceQuery, DeviceRegistry, Discoverable, Machine, Result};

use crate::led::{LedDevice, LED_DEVICE_TYPE, PIN_PROPERTY};

/// Scout that registers one LED per configured pin.
pub struct LedScout {
    pins: Vec<PinId>,
    io: Arc<dyn PinIo>,
}

impl LedScout {
    /// Create a scout for the given pins.
    ///
    /// A label listed more than once is only scouted once, at its first
    /// position.
    #[must_use]
    pub fn new(pins: impl IntoIterator<Item = PinId>, io: Arc<dyn PinIo>) -> Self {
        let mut seen = HashSet::new();
        let pins = pins
            .into_iter()
            .filter(|pin| {
                let first = seen.insert(pin.clone());
                if !first {
                    tracing::warn!(pin = %pin, "Ignoring duplicate LED pin");
                }
                first
            })
            .collect();

        Self { pins, io }
    }
}

impl std::fmt::Debug for LedScout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedScout")
            .field("pins", &self.pins)
            .finish_non_exhaustive()
    }
}

/// Registry query for the LED on `pin`.
#[must_use]
pub fn led_query(pin: &PinId) -> DeviceQuery {
    DeviceQuery::new()
        .with_type(LED_DEVICE_TYPE)
        .with_property(PIN_PROPERTY, pin.as_str())
}

#[async_trait]
impl Discoverable for LedScout {
    fn name(&self) -> &str {
        LED_DEVICE_TYPE
    }

    async fn init(&self, registry: Arc<dyn DeviceRegistry>) -> Result<()> {
        let pins = self.pins.clone();
        let io = Arc::clone(&self.io);

        tokio::spawn(async move {
            match io.platform_info().await {
                Ok(platform) => {
                    tracing::info!(platform = %platform.name, pins = pins.len(), "Platform ready");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Platform detection failed, no LEDs registered");
                    return;
                }
            }

            for pin in pins {
                tokio::spawn(attach_pin(Arc::clone(&registry), Arc::clone(&io), pin));
            }
        });

        Ok(())
    }
}

async fn attach_pin(registry: Arc<dyn DeviceRegistry>, io: Arc<dyn PinIo>, pin: PinId) {
    match register_pin(registry.as_ref(), io, &pin).await {
        Ok(device_id) => tracing::debug!(pin = %pin, device_id = %device_id, "LED ready"),
        Err(e) => tracing::warn!(pin = %pin, error = %e, "Skipping LED pin"),
    }
}

async fn register_pin(
    registry: &dyn DeviceRegistry,
    io: Arc<dyn PinIo>,
    pin: &PinId,
) -> Result<DeviceId> {
    let existing = registry.find(&led_query(pin)).await?.into_iter().next();

    let machine = Machine::initialize(LedDevice::new(pin.clone(), io))?;

    match existing {
        Some(record) => registry.provision(record, machine.boxed()).await,
        None => {
            tracing::debug!(pin = %pin, "No LED record, discovering");
            registry.discover(machine.boxed()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_matches_type_and_pin() {
        let pin = PinId::new("P9_12").unwrap();
        let query = led_query(&pin);
        assert_eq!(query.device_type.as_deref(), Some(LED_DEVICE_TYPE));
        assert_eq!(query.properties.get(PIN_PROPERTY).unwrap(), "P9_12");
    }

    #[test]
    fn repeated_pins_are_scouted_once() {
        let io: Arc<dyn PinIo> = Arc::new(boneled_hal::MockBoard::new());
        let pins = ["P9_12", "P9_11", "P9_12"].map(|label| PinId::new(label).unwrap());

        let scout = LedScout::new(pins, io);
        assert_eq!(
            scout.pins,
            vec![PinId::new("P9_12").unwrap(), PinId::new("P9_11").unwrap()]
        );
    }
}
