//! Application wiring.
//!
//! Chooses the pin backend, creates the device server, registers the LED
//! scout for the configured pins and starts discovery.

use std::sync::Arc;

use boneled_hal::{CdevBoard, PinIo};
use boneled_led::LedScout;
use boneled_runtime::{DeviceServer, ServerConfig};
use boneled_store::Store;

use crate::config::{GatewayConfig, GpioBackend};
use crate::error::BootstrapError;

/// Create the pin backend selected by the configuration.
///
/// # Errors
///
/// Returns `BootstrapError::Config` if the mock backend is requested in a
/// build without the `dev-mode` feature.
pub fn open_board(config: &GatewayConfig) -> Result<Arc<dyn PinIo>, BootstrapError> {
    match config.gpio_backend {
        GpioBackend::Cdev => {
            tracing::info!(chip_prefix = %config.gpio_chip_prefix, "Using GPIO character devices");
            Ok(Arc::new(CdevBoard::with_chip_prefix(
                config.gpio_chip_prefix.as_str(),
            )))
        }
        #[cfg(feature = "dev-mode")]
        GpioBackend::Mock => {
            tracing::warn!("DEV MODE ENABLED - using in-memory GPIO board");
            Ok(Arc::new(boneled_hal::MockBoard::new()))
        }
        #[cfg(not(feature = "dev-mode"))]
        GpioBackend::Mock => Err(BootstrapError::Config(
            "the mock GPIO backend requires the dev-mode feature".to_string(),
        )),
    }
}

/// Create the device server and start LED discovery.
///
/// Returns once the scout has been initialized; LEDs appear in the
/// registry as their pins are processed.
///
/// # Errors
///
/// Returns an error if a configured pin is malformed or the scout cannot
/// be started.
pub async fn start_server<S>(
    config: &GatewayConfig,
    store: Arc<S>,
    board: Arc<dyn PinIo>,
) -> Result<Arc<DeviceServer<S>>, BootstrapError>
where
    S: Store + 'static,
{
    let pins = config.pin_ids()?;
    tracing::info!(pins = ?config.pins, "Registering LED scout");

    let server = Arc::new(DeviceServer::new(
        store,
        ServerConfig::new(config.name.as_str()),
    ));
    server.register_scout(Arc::new(LedScout::new(pins, board)));
    server.start().await?;

    Ok(server)
}
