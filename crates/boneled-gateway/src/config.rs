//! Gateway configuration types.
//!
//! Defaults reproduce the stock BeagleBone LED setup: LEDs on `P9_12` and
//! `P9_11`, served on port 1337. Each field can be overridden from the
//! environment.

use std::str::FromStr;
use std::time::Duration;

use boneled_core::{IdError, PinId};
use serde::Deserialize;

use crate::error::BootstrapError;

/// Pin I/O backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpioBackend {
    /// Linux GPIO character devices.
    #[default]
    Cdev,
    /// In-memory board (requires the `dev-mode` feature).
    Mock,
}

impl FromStr for GpioBackend {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cdev" => Ok(Self::Cdev),
            "mock" => Ok(Self::Mock),
            other => Err(BootstrapError::Config(format!(
                "unknown GPIO backend {other:?}, expected \"cdev\" or \"mock\""
            ))),
        }
    }
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Application name reported by `GET /`.
    #[serde(default = "GatewayConfig::default_name")]
    pub name: String,

    /// Listen address (e.g., "0.0.0.0:1337").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Registry database directory.
    #[serde(default = "GatewayConfig::default_data_dir")]
    pub data_dir: String,

    /// Pins with an LED attached, in discovery order.
    #[serde(default = "GatewayConfig::default_pins")]
    pub pins: Vec<String>,

    /// Pin I/O backend.
    #[serde(default)]
    pub gpio_backend: GpioBackend,

    /// Path prefix of the GPIO chip devices.
    #[serde(default = "GatewayConfig::default_chip_prefix")]
    pub gpio_chip_prefix: String,

    /// Allowed CORS origins; `*` allows any origin.
    #[serde(default = "GatewayConfig::default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl GatewayConfig {
    fn default_name() -> String {
        "BeagleBone LED".to_string()
    }

    fn default_listen_addr() -> String {
        "0.0.0.0:1337".to_string()
    }

    fn default_data_dir() -> String {
        "/var/lib/boneled".to_string()
    }

    fn default_pins() -> Vec<String> {
        vec!["P9_12".to_string(), "P9_11".to_string()]
    }

    fn default_chip_prefix() -> String {
        boneled_hal::cdev::DEFAULT_CHIP_PREFIX.to_string()
    }

    fn default_cors_origins() -> Vec<String> {
        vec!["*".to_string()]
    }

    const fn default_max_body() -> usize {
        64 * 1024 // 64 KB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Load the configuration from environment variables.
    ///
    /// Reads `LISTEN_ADDR`, `DATA_DIR`, `LED_PINS` (comma separated),
    /// `GPIO_BACKEND` and `GPIO_CHIP_PREFIX`; anything unset keeps its default.
    ///
    /// # Errors
    ///
    /// Returns an error if `GPIO_BACKEND` names an unknown backend.
    pub fn from_env() -> Result<Self, BootstrapError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if `GPIO_BACKEND` names an unknown backend.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BootstrapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            config.data_dir = dir;
        }
        if let Some(pins) = lookup("LED_PINS") {
            config.pins = pins
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(backend) = lookup("GPIO_BACKEND") {
            config.gpio_backend = backend.parse()?;
        }
        if let Some(prefix) = lookup("GPIO_CHIP_PREFIX") {
            config.gpio_chip_prefix = prefix;
        }

        Ok(config)
    }

    /// Parse the configured pin labels.
    ///
    /// # Errors
    ///
    /// Returns the first label that is not a valid pin identifier.
    pub fn pin_ids(&self) -> Result<Vec<PinId>, IdError> {
        self.pins.iter().map(|p| PinId::new(p.as_str())).collect()
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            listen_addr: Self::default_listen_addr(),
            data_dir: Self::default_data_dir(),
            pins: Self::default_pins(),
            gpio_backend: GpioBackend::default(),
            gpio_chip_prefix: Self::default_chip_prefix(),
            cors_origins: Self::default_cors_origins(),
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}
