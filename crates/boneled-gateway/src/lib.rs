//! HTTP and WebSocket gateway for boneled.
//!
//! This crate exposes the device host over HTTP:
//!
//! - REST endpoints for listing devices and applying transitions
//! - A WebSocket stream of device events
//! - Application wiring for the BeagleBone LED setup
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Clients                              │
//! │                   (HTTP / WebSocket)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     boneled-gateway                         │
//! │        ┌─────────────┐        ┌─────────────────────┐       │
//! │        │   Router    │        │    Event stream     │       │
//! │        │ + Handlers  │        │    (WebSocket)      │       │
//! │        └─────────────┘        └─────────────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                      ┌───────────────┐
//!                      │ DeviceServer  │──▶ LED scout ──▶ GPIO
//!                      └───────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use boneled_gateway::{bootstrap, create_router, GatewayConfig, GatewayState};
//! use boneled_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::default();
//! let store = Arc::new(RocksStore::open(&config.data_dir)?);
//! let board = bootstrap::open_board(&config)?;
//! let server = bootstrap::start_server(&config, store, board).await?;
//!
//! let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
//! let app = create_router(GatewayState::new(server, config));
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{GatewayConfig, GpioBackend};
pub use error::{ApiError, BootstrapError};
pub use routes::create_router;
pub use state::GatewayState;
