//! Core types and utilities for boneled.
//!
//! This crate provides the identifiers shared by every other boneled crate:
//!
//! - **`DeviceId`**: registry identifier of a device record
//! - **`PinId`**: opaque label of a physical GPIO pin (e.g. `P9_12`)
//!
//! # Example
//!
//! ```
//! use boneled_core::{DeviceId, PinId};
//!
//! let pin = PinId::new("P9_12").unwrap();
//! assert_eq!(pin.as_str(), "P9_12");
//!
//! let device_id = DeviceId::generate();
//! let parsed: DeviceId = device_id.to_string().parse().unwrap();
//! assert_eq!(device_id, parsed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{DeviceId, IdError, PinId};
