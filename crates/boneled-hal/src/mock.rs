//! In-memory pin backend.
//!
//! `MockBoard` records every mode change and write so tests can assert on
//! the exact sequence of pin operations. It is also the backend used by the
//! gateway in `dev-mode` on machines without GPIO hardware.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use boneled_core::PinId;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::{HalError, Result};
use crate::traits::PinIo;
use crate::types::{Level, PinMode, PlatformInfo};

/// A recorded pin operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinEvent {
    /// A pin direction was set.
    Mode {
        /// Target pin.
        pin: PinId,
        /// New mode.
        mode: PinMode,
    },
    /// A level was written to an output pin.
    Write {
        /// Target pin.
        pin: PinId,
        /// Level written.
        level: Level,
    },
}

#[derive(Default)]
struct BoardState {
    modes: HashMap<PinId, PinMode>,
    levels: HashMap<PinId, Level>,
    events: Vec<PinEvent>,
    failing: HashSet<PinId>,
    platform_error: Option<String>,
}

/// Recording pin backend for tests and development.
pub struct MockBoard {
    name: String,
    state: Mutex<BoardState>,
    ready: watch::Sender<bool>,
}

impl MockBoard {
    /// Create a board whose platform is immediately ready.
    #[must_use]
    pub fn new() -> Self {
        let (ready, _) = watch::channel(true);
        Self {
            name: "Mock BeagleBone".to_string(),
            state: Mutex::new(BoardState::default()),
            ready,
        }
    }

    /// Create a board whose `platform_info` blocks until
    /// [`release_platform`](Self::release_platform) is called.
    #[must_use]
    pub fn gated() -> Self {
        let board = Self::new();
        board.ready.send_replace(false);
        board
    }

    /// Complete platform detection for a gated board.
    pub fn release_platform(&self) {
        self.ready.send_replace(true);
    }

    /// Make every subsequent write to `pin` fail.
    pub fn fail_writes(&self, pin: &PinId) {
        self.state.lock().failing.insert(pin.clone());
    }

    /// Make platform detection fail with `message`.
    pub fn fail_platform(&self, message: impl Into<String>) {
        self.state.lock().platform_error = Some(message.into());
    }

    /// All recorded operations, in order.
    #[must_use]
    pub fn events(&self) -> Vec<PinEvent> {
        self.state.lock().events.clone()
    }

    /// Levels written to `pin`, in order.
    #[must_use]
    pub fn writes(&self, pin: &PinId) -> Vec<Level> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                PinEvent::Write { pin: p, level } if p == pin => Some(*level),
                _ => None,
            })
            .collect()
    }

    /// Current level of `pin`, if it has been written.
    #[must_use]
    pub fn level(&self, pin: &PinId) -> Option<Level> {
        self.state.lock().levels.get(pin).copied()
    }

    /// Current mode of `pin`, if it has been configured.
    #[must_use]
    pub fn mode(&self, pin: &PinId) -> Option<PinMode> {
        self.state.lock().modes.get(pin).copied()
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBoard")
            .field("name", &self.name)
            .field("ready", &*self.ready.borrow())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PinIo for MockBoard {
    fn set_pin_mode(&self, pin: &PinId, mode: PinMode) -> Result<()> {
        let mut state = self.state.lock();
        state.modes.insert(pin.clone(), mode);
        state.events.push(PinEvent::Mode {
            pin: pin.clone(),
            mode,
        });
        Ok(())
    }

    fn digital_write(&self, pin: &PinId, level: Level) -> Result<()> {
        let mut state = self.state.lock();
        if state.modes.get(pin) != Some(&PinMode::Output) {
            return Err(HalError::NotOutput(pin.clone()));
        }
        if state.failing.contains(pin) {
            return Err(HalError::Gpio {
                pin: pin.clone(),
                message: "injected write failure".to_string(),
            });
        }

        state.levels.insert(pin.clone(), level);
        state.events.push(PinEvent::Write {
            pin: pin.clone(),
            level,
        });
        Ok(())
    }

    async fn platform_info(&self) -> Result<PlatformInfo> {
        let mut ready = self.ready.subscribe();
        ready
            .wait_for(|ready| *ready)
            .await
            .map_err(|e| HalError::Platform(e.to_string()))?;

        if let Some(message) = self.state.lock().platform_error.clone() {
            return Err(HalError::Platform(message));
        }

        Ok(PlatformInfo {
            name: self.name.clone(),
            serial_number: None,
        })
    }
}
