//! Error types for the device runtime.
//!
//! This module defines all errors that can occur while building state
//! machines, hosting devices and applying transitions.

use boneled_core::DeviceId;
use thiserror::Error;

/// A result type using `RuntimeError`.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The requested device is not hosted by this server.
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// The transition is not allowed from the device's current state.
    #[error("transition {transition:?} is not allowed from state {state:?}")]
    InvalidTransition {
        /// The device's current state.
        state: String,
        /// The requested transition.
        transition: String,
    },

    /// A device declared an incomplete or inconsistent state machine.
    #[error("invalid state machine: {0}")]
    InvalidMachine(String),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] boneled_store::StoreError),

    /// Pin I/O error.
    #[error("hardware error: {0}")]
    Hardware(#[from] boneled_hal::HalError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_device_and_transition() {
        let device_id = DeviceId::generate();
        assert_eq!(
            RuntimeError::DeviceNotFound(device_id).to_string(),
            format!("device not found: {device_id}")
        );
        assert_eq!(
            RuntimeError::InvalidTransition {
                state: "on".into(),
                transition: "turn-on".into(),
            }
            .to_string(),
            r#"transition "turn-on" is not allowed from state "on""#
        );
    }

    #[test]
    fn store_errors_convert() {
        let device_id = DeviceId::generate();
        let err: RuntimeError = boneled_store::StoreError::DeviceNotFound(device_id).into();
        assert!(matches!(err, RuntimeError::Store(_)));
        assert!(err.to_string().contains(&device_id.to_string()));
    }
}
