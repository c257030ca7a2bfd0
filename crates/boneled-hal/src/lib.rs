//! Pin I/O for boneled.
//!
//! This crate provides the hardware seam used by LED devices:
//!
//! - [`PinIo`]: set a pin's direction, drive its level, detect the platform
//! - [`CdevBoard`]: Linux GPIO character-device backend for the BeagleBone Black
//! - [`header`]: header label to GPIO bank/offset map
//! - `MockBoard` (feature `mock`): recording backend for tests and development

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cdev;
pub mod error;
pub mod header;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod traits;
pub mod types;

pub use cdev::CdevBoard;
pub use error::{HalError, Result};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBoard, PinEvent};
pub use traits::PinIo;
pub use types::{Level, PinMode, PlatformInfo};
