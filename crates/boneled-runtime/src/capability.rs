//! Capability traits implemented by device integrations.
//!
//! - [`Transitionable`]: a device with a declared state machine
//! - [`Discoverable`]: a scout that finds devices at startup and hands them
//!   to the [`DeviceRegistry`]

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::machine::MachineConfig;
use crate::registry::DeviceRegistry;

/// A device whose behavior is described by a state machine.
pub trait Transitionable: Sized + Send + 'static {
    /// Prepare the device and declare its state machine.
    ///
    /// Called exactly once, by [`Machine::initialize`](crate::Machine::initialize).
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be brought up.
    fn init(&mut self, config: &mut MachineConfig<Self>) -> Result<()>;

    /// The device's current state.
    fn state(&self) -> &str;
}

/// A startup routine that registers devices with the host.
#[async_trait]
pub trait Discoverable: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Start discovery.
    ///
    /// Implementations may return before every device has been registered;
    /// the host does not wait for discovery to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery cannot be started at all.
    async fn init(&self, registry: Arc<dyn DeviceRegistry>) -> Result<()>;
}
