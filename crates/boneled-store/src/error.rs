//! Registry store errors.

use boneled_core::DeviceId;
use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while reading or writing device records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the device.
    #[error("no record for device {0}")]
    DeviceNotFound(DeviceId),

    /// `RocksDB` rejected the operation.
    #[error("database error: {0}")]
    Database(String),

    /// A record could not be encoded to or decoded from CBOR.
    #[error("record encoding error: {0}")]
    Encoding(String),
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        Self::Database(e.into_string())
    }
}
