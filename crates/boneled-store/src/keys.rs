//! Key encoding utilities for `RocksDB`.
//!
//! All index keys are laid out so that a prefix scan returns every device of
//! one type.

use boneled_core::DeviceId;

const TYPE_SEPARATOR: u8 = 0x00;
const DEVICE_ID_LEN: usize = 16;

/// Encode a device key (just the device ID bytes).
#[must_use]
pub fn device_key(device_id: &DeviceId) -> Vec<u8> {
    device_id.as_bytes().to_vec()
}

/// Encode a type-device index key: `type || 0x00 || device_id`.
#[must_use]
pub fn type_device_key(device_type: &str, device_id: &DeviceId) -> Vec<u8> {
    let mut key = type_prefix(device_type);
    key.extend_from_slice(device_id.as_bytes());
    key
}

/// Encode a type prefix for scanning all devices of one type.
///
/// The trailing separator keeps `led` from matching `led_strip` entries.
#[must_use]
pub fn type_prefix(device_type: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(device_type.len() + 1 + DEVICE_ID_LEN);
    key.extend_from_slice(device_type.as_bytes());
    key.push(TYPE_SEPARATOR);
    key
}

/// Extract the device ID from a type-device key.
///
/// # Panics
///
/// Panics if the key is shorter than 16 bytes.
#[must_use]
pub fn extract_device_id_from_type_key(key: &[u8]) -> DeviceId {
    let mut bytes = [0u8; DEVICE_ID_LEN];
    bytes.copy_from_slice(&key[key.len() - DEVICE_ID_LEN..]);
    DeviceId::from_bytes(bytes)
}
