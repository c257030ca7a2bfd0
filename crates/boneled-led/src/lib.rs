//! BeagleBone LED integration for boneled.
//!
//! - [`LedDevice`]: a two-state device (`off`, `on`) driving one pin
//! - [`LedScout`]: registers one LED per configured pin at startup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use boneled_hal::{CdevBoard, PinIo};
//! use boneled_led::LedScout;
//! use boneled_runtime::{DeviceServer, PinId, ServerConfig};
//! use boneled_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/var/lib/boneled")?);
//! let server = Arc::new(DeviceServer::new(store, ServerConfig::new("BeagleBone LED")));
//!
//! let board: Arc<dyn PinIo> = Arc::new(CdevBoard::new());
//! let pins = [PinId::new("P9_12")?, PinId::new("P9_11")?];
//! server.register_scout(Arc::new(LedScout::new(pins, board)));
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod led;
pub mod scout;

pub use led::{LedDevice, LedState, LED_DEVICE_TYPE, PIN_PROPERTY, TURN_OFF, TURN_ON};
pub use scout::{led_query, LedScout};
