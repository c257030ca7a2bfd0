//! Linux GPIO character-device backend.
//!
//! Lines are requested through `gpiocdev` on `/dev/gpiochipN`, where `N` is
//! the AM335x bank from the [`header`](crate::header) map. A claimed line is
//! held until the board is dropped or the pin mode is changed.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use boneled_core::PinId;
use gpiocdev::line::Value;
use gpiocdev::Request;
use parking_lot::Mutex;

use crate::error::{HalError, Result};
use crate::header::{self, GpioLine};
use crate::traits::PinIo;
use crate::types::{Level, PinMode, PlatformInfo};

/// Default device path prefix for GPIO chips.
pub const DEFAULT_CHIP_PREFIX: &str = "/dev/gpiochip";

/// Consumer label attached to claimed lines.
pub const DEFAULT_CONSUMER: &str = "boneled";

const MODEL_PATH: &str = "/proc/device-tree/model";
const SERIAL_PATH: &str = "/proc/device-tree/serial-number";

struct ClaimedLine {
    request: Request,
    offset: u32,
    mode: PinMode,
}

/// GPIO backend for a BeagleBone running Linux.
pub struct CdevBoard {
    chip_prefix: String,
    consumer: String,
    model_path: PathBuf,
    serial_path: PathBuf,
    lines: Mutex<HashMap<PinId, ClaimedLine>>,
}

impl CdevBoard {
    /// Create a board using `/dev/gpiochipN` devices.
    #[must_use]
    pub fn new() -> Self {
        Self::with_chip_prefix(DEFAULT_CHIP_PREFIX)
    }

    /// Create a board with a custom chip path prefix.
    ///
    /// Newer kernels may number the AM335x banks differently; the prefix is
    /// joined with the bank number to form the chip path.
    #[must_use]
    pub fn with_chip_prefix(prefix: impl Into<String>) -> Self {
        Self {
            chip_prefix: prefix.into(),
            consumer: DEFAULT_CONSUMER.to_string(),
            model_path: PathBuf::from(MODEL_PATH),
            serial_path: PathBuf::from(SERIAL_PATH),
            lines: Mutex::new(HashMap::new()),
        }
    }

    /// Read the platform description from a different device-tree root.
    #[must_use]
    pub fn with_device_tree(mut self, model_path: PathBuf, serial_path: PathBuf) -> Self {
        self.model_path = model_path;
        self.serial_path = serial_path;
        self
    }

    /// Get the chip path prefix.
    #[must_use]
    pub fn chip_prefix(&self) -> &str {
        &self.chip_prefix
    }

    fn chip_path(&self, line: GpioLine) -> String {
        format!("{}{}", self.chip_prefix, line.bank)
    }

    fn request_line(&self, pin: &PinId, line: GpioLine, mode: PinMode) -> Result<Request> {
        let mut builder = Request::builder();
        builder
            .on_chip(self.chip_path(line))
            .with_consumer(self.consumer.as_str())
            .with_line(line.offset);
        match mode {
            PinMode::Output => builder.as_output(Value::Inactive),
            PinMode::Input => builder.as_input(),
        };

        builder.request().map_err(|e| HalError::Gpio {
            pin: pin.clone(),
            message: e.to_string(),
        })
    }
}

impl Default for CdevBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a device-tree string property, which is NUL-terminated.
async fn read_dt_string(path: &PathBuf) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw.trim_end_matches('\0').trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(HalError::Platform(format!("{}: {e}", path.display()))),
    }
}

#[async_trait]
impl PinIo for CdevBoard {
    fn set_pin_mode(&self, pin: &PinId, mode: PinMode) -> Result<()> {
        let line = header::lookup(pin).ok_or_else(|| HalError::UnknownPin(pin.clone()))?;

        let mut lines = self.lines.lock();
        // Release any previous claim before re-requesting the line
        lines.remove(pin);

        let request = self.request_line(pin, line, mode)?;
        lines.insert(
            pin.clone(),
            ClaimedLine {
                request,
                offset: line.offset,
                mode,
            },
        );

        tracing::debug!(
            pin = %pin,
            chip = %self.chip_path(line),
            offset = line.offset,
            mode = ?mode,
            "Claimed GPIO line"
        );

        Ok(())
    }

    fn digital_write(&self, pin: &PinId, level: Level) -> Result<()> {
        let lines = self.lines.lock();
        let claimed = lines
            .get(pin)
            .filter(|claimed| claimed.mode == PinMode::Output)
            .ok_or_else(|| HalError::NotOutput(pin.clone()))?;

        claimed
            .request
            .set_value(claimed.offset, level.into())
            .map_err(|e| HalError::Gpio {
                pin: pin.clone(),
                message: e.to_string(),
            })?;

        tracing::trace!(pin = %pin, level = level.as_bit(), "Wrote GPIO line");

        Ok(())
    }

    async fn platform_info(&self) -> Result<PlatformInfo> {
        let name = read_dt_string(&self.model_path)
            .await?
            .unwrap_or_else(|| "unknown".to_string());
        let serial_number = read_dt_string(&self.serial_path).await?;

        Ok(PlatformInfo {
            name,
            serial_number,
        })
    }
}
