//! Registry and host traits.
//!
//! [`DeviceRegistry`] is the narrow surface scouts see. [`DeviceHost`] adds
//! what the HTTP gateway needs: listing, lookup, transitions and events.

use async_trait::async_trait;
use boneled_core::DeviceId;
use boneled_store::{DeviceQuery, DeviceRecord};
use tokio::sync::broadcast;

use crate::error::Result;
use crate::machine::DeviceInstance;
use crate::types::{DeviceEvent, DeviceView};

/// Device registry operations available to scouts.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Find persisted device records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry store cannot be read.
    async fn find(&self, query: &DeviceQuery) -> Result<Vec<DeviceRecord>>;

    /// Reattach a live device to an existing record.
    ///
    /// The record keeps its ID; its state and properties are refreshed from
    /// the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be updated.
    async fn provision(
        &self,
        record: DeviceRecord,
        device: Box<dyn DeviceInstance>,
    ) -> Result<DeviceId>;

    /// Register a newly found device under a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    async fn discover(&self, device: Box<dyn DeviceInstance>) -> Result<DeviceId>;
}

/// Full host operations used by the gateway.
#[async_trait]
pub trait DeviceHost: DeviceRegistry {
    /// Application name.
    fn name(&self) -> &str;

    /// Number of live devices.
    fn device_count(&self) -> usize;

    /// List persisted devices matching a query, with live state where
    /// available.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry store cannot be read.
    async fn list_devices(&self, query: &DeviceQuery) -> Result<Vec<DeviceView>>;

    /// Get a single device.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::DeviceNotFound` if the device is neither live
    /// nor persisted.
    async fn get_device(&self, device_id: &DeviceId) -> Result<DeviceView>;

    /// Apply a transition to a live device.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::DeviceNotFound` if the device is not live, or
    /// `RuntimeError::InvalidTransition` if its state does not allow it.
    async fn transition(&self, device_id: &DeviceId, transition: &str) -> Result<DeviceView>;

    /// Subscribe to device events.
    fn subscribe(&self) -> broadcast::Receiver<DeviceEvent>;
}
