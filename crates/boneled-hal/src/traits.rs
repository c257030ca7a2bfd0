//! Pin I/O trait.

use async_trait::async_trait;
use boneled_core::PinId;

use crate::error::Result;
use crate::types::{Level, PinMode, PlatformInfo};

/// Access to the digital pins of a board.
///
/// Pin writes are short synchronous operations; only platform detection is
/// asynchronous. Implementations must be shareable across tasks.
#[async_trait]
pub trait PinIo: Send + Sync {
    /// Configure the direction of a pin.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin is unknown or the line cannot be claimed.
    fn set_pin_mode(&self, pin: &PinId, mode: PinMode) -> Result<()>;

    /// Drive an output pin to the given level.
    ///
    /// # Errors
    ///
    /// Returns `HalError::NotOutput` if the pin was not set to output mode.
    fn digital_write(&self, pin: &PinId, level: Level) -> Result<()>;

    /// Detect the platform. Completes once detection is done.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform description cannot be read.
    async fn platform_info(&self) -> Result<PlatformInfo>;
}
