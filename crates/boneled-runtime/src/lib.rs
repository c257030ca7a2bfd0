//! Device host runtime for boneled.
//!
//! This crate hosts device integrations. Devices declare a state machine and
//! the host guards every transition; scouts find devices at startup and hand
//! them to the registry.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Gateway (HTTP/WS)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ DeviceHost
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DeviceServer                          │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   Scouts    │ │    Live     │ │   Event broadcast   │    │
//! │  │ (discovery) │ │  machines   │ │                     │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                      ┌───────────────┐
//!                      │     Store     │
//!                      │   (RocksDB)   │
//!                      └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use boneled_runtime::{DeviceServer, ServerConfig};
//! use boneled_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/boneled")?);
//! let server = Arc::new(DeviceServer::new(store, ServerConfig::new("BeagleBone LED")));
//!
//! // server.register_scout(...);
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod capability;
pub mod error;
pub mod machine;
pub mod registry;
pub mod server;
pub mod types;

pub use capability::{Discoverable, Transitionable};
pub use error::{Result, RuntimeError};
pub use machine::{DeviceInstance, Handler, Machine, MachineConfig};
pub use registry::{DeviceHost, DeviceRegistry};
pub use server::DeviceServer;
pub use types::{DeviceEvent, DeviceView, ServerConfig, DEFAULT_EVENT_CAPACITY};

// Re-export commonly used types from dependencies for convenience
pub use boneled_core::{DeviceId, PinId};
pub use boneled_store::{DeviceQuery, DeviceRecord};
