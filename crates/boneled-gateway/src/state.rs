//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use boneled_runtime::DeviceHost;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<H>
where
    H: DeviceHost,
{
    /// The device host.
    pub host: Arc<H>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<H> GatewayState<H>
where
    H: DeviceHost,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(host: Arc<H>, config: GatewayConfig) -> Self {
        Self { host, config }
    }
}

impl<H> Clone for GatewayState<H>
where
    H: DeviceHost,
{
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            config: self.config.clone(),
        }
    }
}
