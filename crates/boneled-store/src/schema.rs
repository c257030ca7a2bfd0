//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary device records, keyed by `device_id`.
    pub const DEVICES: &str = "devices";

    /// Index: devices by type, keyed by `type || 0x00 || device_id`.
    pub const DEVICES_BY_TYPE: &str = "devices_by_type";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::DEVICES, cf::DEVICES_BY_TYPE]
}
