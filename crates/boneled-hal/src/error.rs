//! Error types for pin I/O.

use boneled_core::PinId;
use thiserror::Error;

/// A result type using `HalError`.
pub type Result<T> = std::result::Result<T, HalError>;

/// Errors reported by a pin I/O backend.
#[derive(Debug, Error)]
pub enum HalError {
    /// The pin label does not name a GPIO on this board.
    #[error("unknown pin: {0}")]
    UnknownPin(PinId),

    /// The pin has not been configured as an output.
    #[error("pin {0} is not configured as an output")]
    NotOutput(PinId),

    /// The GPIO character device rejected a request.
    #[error("gpio error on pin {pin}: {message}")]
    Gpio {
        /// The pin being accessed.
        pin: PinId,
        /// Backend error message.
        message: String,
    },

    /// Platform detection failed.
    #[error("platform detection failed: {0}")]
    Platform(String),
}
