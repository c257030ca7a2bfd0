//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use boneled_core::DeviceId;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::types::DeviceRecord;
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Encoding(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Encoding(e.to_string()))
    }
}

impl Store for RocksStore {
    fn put_device(&self, device: &DeviceRecord) -> Result<()> {
        let cf_devices = self.cf(cf::DEVICES)?;
        let cf_by_type = self.cf(cf::DEVICES_BY_TYPE)?;

        let device_key = keys::device_key(&device.device_id);
        let type_key = keys::type_device_key(&device.device_type, &device.device_id);
        let value = Self::serialize(device)?;

        // A record may be re-put under a different type; drop the stale index entry
        let old_type = self
            .db
            .get_cf(&cf_devices, &device_key)?
            .map(|data| Self::deserialize::<DeviceRecord>(&data))
            .transpose()?
            .map(|d| d.device_type);

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_devices, &device_key, &value);

        if let Some(old) = old_type {
            if old != device.device_type {
                let old_type_key = keys::type_device_key(&old, &device.device_id);
                batch.delete_cf(&cf_by_type, &old_type_key);
            }
        }
        batch.put_cf(&cf_by_type, &type_key, []);

        self.db.write(batch)?;

        tracing::trace!(device_id = %device.device_id, "Stored device record");

        Ok(())
    }

    fn get_device(&self, device_id: &DeviceId) -> Result<Option<DeviceRecord>> {
        let cf = self.cf(cf::DEVICES)?;
        let key = keys::device_key(device_id);

        self.db
            .get_cf(&cf, key)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_devices(&self) -> Result<Vec<DeviceRecord>> {
        let cf = self.cf(cf::DEVICES)?;

        let mut devices = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        for item in iter {
            let (_, value) = item?;
            devices.push(Self::deserialize(&value)?);
        }

        Ok(devices)
    }

    fn list_devices_by_type(&self, device_type: &str) -> Result<Vec<DeviceRecord>> {
        let cf_by_type = self.cf(cf::DEVICES_BY_TYPE)?;
        let prefix = keys::type_prefix(device_type);

        let mut devices = Vec::new();
        let iter = self.db.iterator_cf(
            &cf_by_type,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        for item in iter {
            let (key, _) = item?;

            // Stop if we're past the prefix
            if !key.starts_with(&prefix) {
                break;
            }

            let device_id = keys::extract_device_id_from_type_key(&key);
            if let Some(device) = self.get_device(&device_id)? {
                devices.push(device);
            }
        }

        Ok(devices)
    }

    fn update_device_state(&self, device_id: &DeviceId, state: &str) -> Result<DeviceRecord> {
        let mut device = self
            .get_device(device_id)?
            .ok_or(StoreError::DeviceNotFound(*device_id))?;
        state.clone_into(&mut device.state);
        device.updated_at = chrono::Utc::now();
        self.put_device(&device)?;
        Ok(device)
    }
}
