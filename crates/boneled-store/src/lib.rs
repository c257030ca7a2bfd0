//! `RocksDB` device registry storage for boneled.
//!
//! This crate persists device records so that devices discovered in one run
//! can be provisioned again in the next.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `devices`: Primary device records, keyed by `device_id`
//! - `devices_by_type`: Index for listing devices by type
//!
//! # Example
//!
//! ```no_run
//! use boneled_store::{DeviceQuery, RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/boneled-db").unwrap();
//!
//! let query = DeviceQuery::new()
//!     .with_type("beaglebone_led")
//!     .with_property("pin", "P9_12");
//! let matches = store.find_devices(&query).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod query;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use query::DeviceQuery;
pub use rocks::RocksStore;
pub use types::DeviceRecord;

use boneled_core::DeviceId;

/// The storage trait defining all registry operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    /// Insert or update a device record.
    ///
    /// This also maintains the type index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_device(&self, device: &DeviceRecord) -> Result<()>;

    /// Get a device by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_device(&self, device_id: &DeviceId) -> Result<Option<DeviceRecord>>;

    /// List all devices in the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_devices(&self) -> Result<Vec<DeviceRecord>>;

    /// List all devices of one type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_devices_by_type(&self, device_type: &str) -> Result<Vec<DeviceRecord>>;

    /// Update a device's state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DeviceNotFound` if the device has no record.
    fn update_device_state(&self, device_id: &DeviceId, state: &str) -> Result<DeviceRecord>;

    /// Find all devices matching a query, oldest first.
    ///
    /// Uses the type index when the query names a type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_devices(&self, query: &DeviceQuery) -> Result<Vec<DeviceRecord>> {
        let candidates = match &query.device_type {
            Some(device_type) => self.list_devices_by_type(device_type)?,
            None => self.list_devices()?,
        };

        let mut matches: Vec<_> = candidates
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();
        matches.sort_by_key(|record| record.created_at);

        Ok(matches)
    }
}
