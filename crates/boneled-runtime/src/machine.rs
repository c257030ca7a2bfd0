//! Device state machines.
//!
//! A device describes its state machine by filling in a [`MachineConfig`]
//! during [`Transitionable::init`]. The host wraps the device in a
//! [`Machine`], which owns the transition table and refuses any transition
//! the current state does not allow before the device's handler runs.
//!
//! ```text
//!   Transitionable::init ──▶ MachineConfig ──validate──▶ Machine<D>
//!                                                          │
//!                              apply("turn-on") ──────────▶│ allowed? ──▶ handler(&mut D)
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::capability::Transitionable;
use crate::error::{Result, RuntimeError};

/// A transition handler bound to a device.
pub type Handler<D> = Box<dyn Fn(&mut D) -> Result<()> + Send + Sync>;

/// State machine declaration collected from a device.
pub struct MachineConfig<D> {
    device_type: Option<String>,
    initial_state: Option<String>,
    name: Option<String>,
    transitions: BTreeMap<String, Vec<String>>,
    handlers: HashMap<String, Handler<D>>,
    properties: BTreeMap<String, String>,
}

impl<D> MachineConfig<D> {
    /// Create an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            device_type: None,
            initial_state: None,
            name: None,
            transitions: BTreeMap::new(),
            handlers: HashMap::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the device type.
    pub fn device_type(&mut self, device_type: impl Into<String>) -> &mut Self {
        self.device_type = Some(device_type.into());
        self
    }

    /// Set the initial state.
    pub fn state(&mut self, state: impl Into<String>) -> &mut Self {
        self.initial_state = Some(state.into());
        self
    }

    /// Set the display name.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Declare the transitions allowed while in `state`.
    ///
    /// Calling this again for the same state replaces the earlier list.
    pub fn when(&mut self, state: impl Into<String>, allowed: &[&str]) -> &mut Self {
        self.transitions.insert(
            state.into(),
            allowed.iter().map(|t| (*t).to_string()).collect(),
        );
        self
    }

    /// Bind a transition name to its handler.
    pub fn map<F>(&mut self, transition: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut D) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(transition.into(), Box::new(handler));
        self
    }

    /// Attach a static property to the device.
    pub fn property(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Check that the declaration is complete.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::InvalidMachine` if the type or initial state is
    /// missing, or if an allowed transition has no handler.
    pub fn validate(&self) -> Result<()> {
        if self.device_type.as_deref().map_or(true, str::is_empty) {
            return Err(RuntimeError::InvalidMachine("missing device type".into()));
        }
        if self.initial_state.as_deref().map_or(true, str::is_empty) {
            return Err(RuntimeError::InvalidMachine("missing initial state".into()));
        }

        for (state, allowed) in &self.transitions {
            if let Some(missing) = allowed.iter().find(|t| !self.handlers.contains_key(*t)) {
                return Err(RuntimeError::InvalidMachine(format!(
                    "transition {missing:?} allowed in state {state:?} has no handler"
                )));
            }
        }

        Ok(())
    }

    /// Transitions allowed in `state`.
    #[must_use]
    pub fn allowed(&self, state: &str) -> &[String] {
        self.transitions.get(state).map_or(&[], Vec::as_slice)
    }
}

impl<D> Default for MachineConfig<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for MachineConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<_> = self.handlers.keys().collect();
        handlers.sort();
        f.debug_struct("MachineConfig")
            .field("device_type", &self.device_type)
            .field("initial_state", &self.initial_state)
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .field("handlers", &handlers)
            .field("properties", &self.properties)
            .finish()
    }
}

/// A live device as seen by the host.
///
/// This is the type-erased view of a [`Machine`]; the registry stores
/// devices of every kind behind it.
pub trait DeviceInstance: Send {
    /// Device type.
    fn device_type(&self) -> &str;

    /// Display name, if declared.
    fn name(&self) -> Option<&str>;

    /// Current state.
    fn state(&self) -> &str;

    /// Declared properties.
    fn properties(&self) -> &BTreeMap<String, String>;

    /// Transitions allowed from the current state.
    fn allowed_transitions(&self) -> Vec<String>;

    /// Apply a named transition.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::InvalidTransition` if the current state does not
    /// allow it, or whatever error the handler returns.
    fn apply(&mut self, transition: &str) -> Result<()>;
}

/// A device paired with its validated state machine.
pub struct Machine<D> {
    device: D,
    config: MachineConfig<D>,
}

impl<D: Transitionable> Machine<D> {
    /// Run the device's `init` and validate what it declared.
    ///
    /// # Errors
    ///
    /// Returns the device's `init` error, or `RuntimeError::InvalidMachine`
    /// if the declaration is incomplete.
    pub fn initialize(mut device: D) -> Result<Self> {
        let mut config = MachineConfig::new();
        device.init(&mut config)?;
        config.validate()?;

        Ok(Self { device, config })
    }

    /// Box the machine for the registry.
    #[must_use]
    pub fn boxed(self) -> Box<dyn DeviceInstance> {
        Box::new(self)
    }
}

impl<D: Transitionable> DeviceInstance for Machine<D> {
    fn device_type(&self) -> &str {
        self.config.device_type.as_deref().unwrap_or_default()
    }

    fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    fn state(&self) -> &str {
        self.device.state()
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.config.properties
    }

    fn allowed_transitions(&self) -> Vec<String> {
        self.config.allowed(self.device.state()).to_vec()
    }

    fn apply(&mut self, transition: &str) -> Result<()> {
        let state = self.device.state();
        if !self.config.allowed(state).iter().any(|t| t == transition) {
            return Err(RuntimeError::InvalidTransition {
                state: state.to_string(),
                transition: transition.to_string(),
            });
        }

        let handler = self.config.handlers.get(transition).ok_or_else(|| {
            RuntimeError::Internal(format!("no handler for transition {transition:?}"))
        })?;
        handler(&mut self.device)
    }
}

impl<D: Transitionable> fmt::Debug for Machine<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.device.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
