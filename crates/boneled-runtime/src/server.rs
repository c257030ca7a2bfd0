//! Device server implementation.
//!
//! This module provides `DeviceServer`, the implementation of the
//! [`DeviceRegistry`] and [`DeviceHost`] traits. It keeps live device
//! instances in memory and mirrors their records in the registry store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use boneled_core::DeviceId;
use boneled_store::{DeviceQuery, DeviceRecord, Store};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::capability::Discoverable;
use crate::error::{Result, RuntimeError};
use crate::machine::DeviceInstance;
use crate::registry::{DeviceHost, DeviceRegistry};
use crate::types::{DeviceEvent, DeviceView, ServerConfig};

type LiveDevice = Arc<Mutex<Box<dyn DeviceInstance>>>;

/// The device host.
pub struct DeviceServer<S: Store> {
    store: Arc<S>,
    config: ServerConfig,
    devices: RwLock<HashMap<DeviceId, LiveDevice>>,
    scouts: Mutex<Vec<Arc<dyn Discoverable>>>,
    events: broadcast::Sender<DeviceEvent>,
}

impl<S: Store> DeviceServer<S> {
    /// Create a new device server.
    #[must_use]
    pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            store,
            config,
            devices: RwLock::new(HashMap::new()),
            scouts: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Add a scout to run on [`start`](Self::start).
    pub fn register_scout(&self, scout: Arc<dyn Discoverable>) {
        self.scouts.lock().push(scout);
    }

    /// Initialize every registered scout, in registration order.
    ///
    /// Returns once each scout's `init` has returned; scouts may still be
    /// registering devices in the background.
    ///
    /// # Errors
    ///
    /// Returns the first scout initialization error.
    pub async fn start(self: &Arc<Self>) -> Result<()>
    where
        S: 'static,
    {
        let scouts: Vec<_> = self.scouts.lock().clone();
        let registry: Arc<dyn DeviceRegistry> = Arc::clone(self) as Arc<dyn DeviceRegistry>;

        for scout in scouts {
            tracing::debug!(scout = scout.name(), "Initializing scout");
            scout.init(Arc::clone(&registry)).await?;
            tracing::info!(scout = scout.name(), "Scout initialized");
        }

        Ok(())
    }

    fn live(&self, device_id: &DeviceId) -> Option<LiveDevice> {
        self.devices.read().get(device_id).cloned()
    }

    fn attach(&self, device_id: DeviceId, device: Box<dyn DeviceInstance>) {
        let previous = self
            .devices
            .write()
            .insert(device_id, Arc::new(Mutex::new(device)));
        if previous.is_some() {
            tracing::warn!(device_id = %device_id, "Replaced live device instance");
        }
    }

    fn view(&self, record: DeviceRecord) -> DeviceView {
        match self.live(&record.device_id) {
            Some(device) => {
                let device = device.lock();
                DeviceView::live(record, &**device)
            }
            None => DeviceView::offline(record),
        }
    }

    fn publish(&self, event: DeviceEvent) {
        // Sending only fails when nobody is subscribed
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl<S: Store + 'static> DeviceRegistry for DeviceServer<S> {
    async fn find(&self, query: &DeviceQuery) -> Result<Vec<DeviceRecord>> {
        Ok(self.store.find_devices(query)?)
    }

    async fn provision(
        &self,
        mut record: DeviceRecord,
        device: Box<dyn DeviceInstance>,
    ) -> Result<DeviceId> {
        let device_id = record.device_id;

        // The live instance is authoritative; the stored state may predate a restart
        device.device_type().clone_into(&mut record.device_type);
        device.state().clone_into(&mut record.state);
        if let Some(name) = device.name() {
            record.name = Some(name.to_string());
        }
        record.properties.extend(
            device
                .properties()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        record.updated_at = Utc::now();
        self.store.put_device(&record)?;

        self.attach(device_id, device);

        tracing::info!(
            device_id = %device_id,
            device_type = %record.device_type,
            state = %record.state,
            "Provisioned device"
        );

        self.publish(DeviceEvent::Provisioned {
            device_id,
            device_type: record.device_type,
            state: record.state,
        });

        Ok(device_id)
    }

    async fn discover(&self, device: Box<dyn DeviceInstance>) -> Result<DeviceId> {
        let mut record = DeviceRecord::new(device.device_type(), device.state());
        record.name = device.name().map(str::to_string);
        record.properties = device.properties().clone();
        self.store.put_device(&record)?;

        let device_id = record.device_id;
        self.attach(device_id, device);

        tracing::info!(
            device_id = %device_id,
            device_type = %record.device_type,
            "Discovered device"
        );

        self.publish(DeviceEvent::Discovered {
            device_id,
            device_type: record.device_type,
            state: record.state,
            properties: record.properties,
        });

        Ok(device_id)
    }
}

#[async_trait]
impl<S: Store + 'static> DeviceHost for DeviceServer<S> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn device_count(&self) -> usize {
        self.devices.read().len()
    }

    async fn list_devices(&self, query: &DeviceQuery) -> Result<Vec<DeviceView>> {
        let records = self.store.find_devices(query)?;
        Ok(records.into_iter().map(|record| self.view(record)).collect())
    }

    async fn get_device(&self, device_id: &DeviceId) -> Result<DeviceView> {
        let record = self
            .store
            .get_device(device_id)?
            .ok_or(RuntimeError::DeviceNotFound(*device_id))?;
        Ok(self.view(record))
    }

    async fn transition(&self, device_id: &DeviceId, transition: &str) -> Result<DeviceView> {
        let device = self
            .live(device_id)
            .ok_or(RuntimeError::DeviceNotFound(*device_id))?;

        // Hold the device lock until the new state is persisted so concurrent
        // transitions are stored in the order they were applied
        let (view, event) = {
            let mut device = device.lock();
            let mut record = self
                .store
                .get_device(device_id)?
                .ok_or(RuntimeError::DeviceNotFound(*device_id))?;

            let from = device.state().to_string();
            device.apply(transition)?;
            let to = device.state().to_string();

            // The handler has already driven the hardware, so the live
            // instance stays authoritative when the record cannot be updated
            match self.store.update_device_state(device_id, &to) {
                Ok(updated) => record = updated,
                Err(e) => tracing::error!(
                    device_id = %device_id,
                    state = %to,
                    error = %e,
                    "Applied transition but failed to persist device state"
                ),
            }

            let event = DeviceEvent::Transitioned {
                device_id: *device_id,
                transition: transition.to_string(),
                from,
                to,
            };
            (DeviceView::live(record, &**device), event)
        };

        tracing::info!(
            device_id = %device_id,
            transition = %transition,
            state = %view.state,
            "Applied transition"
        );

        self.publish(event);
        Ok(view)
    }

    fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Transitionable;
    use crate::machine::{Machine, MachineConfig};
    use boneled_store::RocksStore;
    use tempfile::TempDir;

    /// Minimal two-state device used to exercise the server.
    struct Switch {
        label: String,
        on: bool,
    }

    impl Switch {
        fn flip_on(&mut self) -> Result<()> {
            self.on = true;
            Ok(())
        }

        fn flip_off(&mut self) -> Result<()> {
            self.on = false;
            Ok(())
        }
    }

    impl Transitionable for Switch {
        fn init(&mut self, config: &mut MachineConfig<Self>) -> Result<()> {
            self.on = false;
            config
                .device_type("switch")
                .state("off")
                .name(self.label.clone())
                .when("off", &["flip-on"])
                .when("on", &["flip-off"])
                .map("flip-on", Self::flip_on)
                .map("flip-off", Self::flip_off)
                .property("label", self.label.clone());
            Ok(())
        }

        fn state(&self) -> &str {
            if self.on {
                "on"
            } else {
                "off"
            }
        }
    }

    fn switch(label: &str) -> Box<dyn DeviceInstance> {
        Machine::initialize(Switch {
            label: label.to_string(),
            on: true,
        })
        .unwrap()
        .boxed()
    }

    fn setup() -> (Arc<DeviceServer<RocksStore>>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        let server = Arc::new(DeviceServer::new(store, ServerConfig::new("test")));
        (server, dir)
    }

    #[tokio::test]
    async fn discover_persists_and_attaches() {
        let (server, _dir) = setup();
        let mut events = server.subscribe();

        let device_id = server.discover(switch("a")).await.unwrap();

        let record = server.store.get_device(&device_id).unwrap().unwrap();
        assert_eq!(record.device_type, "switch");
        assert_eq!(record.state, "off");
        assert_eq!(record.name.as_deref(), Some("a"));
        assert_eq!(record.property("label"), Some("a"));
        assert_eq!(server.device_count(), 1);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, DeviceEvent::Discovered { .. }));
        assert_eq!(event.device_id(), &device_id);
    }

    #[tokio::test]
    async fn provision_keeps_id_and_refreshes_state() {
        let (server, _dir) = setup();
        let stale = DeviceRecord::new("switch", "on").with_property("label", "a");
        server.store.put_device(&stale).unwrap();

        let device_id = server.provision(stale.clone(), switch("a")).await.unwrap();
        assert_eq!(device_id, stale.device_id);

        let record = server.store.get_device(&device_id).unwrap().unwrap();
        assert_eq!(record.state, "off");
        assert_eq!(record.created_at, stale.created_at);
        assert_eq!(server.store.list_devices().unwrap().len(), 1);

        let view = server.get_device(&device_id).await.unwrap();
        assert!(view.online);
        assert_eq!(view.transitions, vec!["flip-on".to_string()]);
    }

    #[tokio::test]
    async fn transition_persists_and_broadcasts() {
        let (server, _dir) = setup();
        let device_id = server.discover(switch("a")).await.unwrap();
        let mut events = server.subscribe();

        let view = server.transition(&device_id, "flip-on").await.unwrap();
        assert_eq!(view.state, "on");
        assert_eq!(view.transitions, vec!["flip-off".to_string()]);

        let record = server.store.get_device(&device_id).unwrap().unwrap();
        assert_eq!(record.state, "on");

        assert_eq!(
            events.recv().await.unwrap(),
            DeviceEvent::Transitioned {
                device_id,
                transition: "flip-on".into(),
                from: "off".into(),
                to: "on".into(),
            }
        );
    }

    #[tokio::test]
    async fn invalid_transition_is_rejected() {
        let (server, _dir) = setup();
        let device_id = server.discover(switch("a")).await.unwrap();

        let result = server.transition(&device_id, "flip-off").await;
        assert!(matches!(result, Err(RuntimeError::InvalidTransition { .. })));

        let view = server.get_device(&device_id).await.unwrap();
        assert_eq!(view.state, "off");
    }

    #[tokio::test]
    async fn transition_unknown_device() {
        let (server, _dir) = setup();
        let result = server.transition(&DeviceId::generate(), "flip-on").await;
        assert!(matches!(result, Err(RuntimeError::DeviceNotFound(_))));
    }

    #[tokio::test]
    async fn persisted_device_without_instance_is_offline() {
        let (server, _dir) = setup();
        let record = DeviceRecord::new("switch", "on").with_property("label", "gone");
        server.store.put_device(&record).unwrap();

        let view = server.get_device(&record.device_id).await.unwrap();
        assert!(!view.online);
        assert_eq!(view.state, "on");
        assert!(view.transitions.is_empty());

        let result = server.transition(&record.device_id, "flip-off").await;
        assert!(matches!(result, Err(RuntimeError::DeviceNotFound(_))));
    }

    #[tokio::test]
    async fn list_devices_filters_by_query() {
        let (server, _dir) = setup();
        server.discover(switch("a")).await.unwrap();
        server.discover(switch("b")).await.unwrap();

        let all = server.list_devices(&DeviceQuery::new()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|d| d.online));

        let query = DeviceQuery::new()
            .with_type("switch")
            .with_property("label", "b");
        let found = server.list_devices(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("b"));
    }

    /// Registry store whose state updates can be made to fail.
    struct ReadOnlyStateStore {
        inner: RocksStore,
        reject_updates: std::sync::atomic::AtomicBool,
    }

    impl ReadOnlyStateStore {
        fn reject_updates(&self, reject: bool) {
            self.reject_updates
                .store(reject, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl Store for ReadOnlyStateStore {
        fn put_device(&self, device: &DeviceRecord) -> boneled_store::Result<()> {
            self.inner.put_device(device)
        }

        fn get_device(&self, device_id: &DeviceId) -> boneled_store::Result<Option<DeviceRecord>> {
            self.inner.get_device(device_id)
        }

        fn list_devices(&self) -> boneled_store::Result<Vec<DeviceRecord>> {
            self.inner.list_devices()
        }

        fn list_devices_by_type(&self, device_type: &str) -> boneled_store::Result<Vec<DeviceRecord>> {
            self.inner.list_devices_by_type(device_type)
        }

        fn update_device_state(
            &self,
            device_id: &DeviceId,
            state: &str,
        ) -> boneled_store::Result<DeviceRecord> {
            if self.reject_updates.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(boneled_store::StoreError::Database("disk full".into()));
            }
            self.inner.update_device_state(device_id, state)
        }
    }

    #[tokio::test]
    async fn transition_survives_failed_state_write() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ReadOnlyStateStore {
            inner: RocksStore::open(dir.path()).unwrap(),
            reject_updates: std::sync::atomic::AtomicBool::new(false),
        });
        let server = Arc::new(DeviceServer::new(Arc::clone(&store), ServerConfig::new("test")));
        let device_id = server.discover(switch("a")).await.unwrap();
        let mut events = server.subscribe();

        store.reject_updates(true);
        let view = server.transition(&device_id, "flip-on").await.unwrap();
        assert_eq!(view.state, "on");
        assert_eq!(view.transitions, vec!["flip-off".to_string()]);
        assert!(matches!(
            events.recv().await.unwrap(),
            DeviceEvent::Transitioned { ref to, .. } if to == "on"
        ));

        // The record lags behind, the live device does not
        assert_eq!(store.get_device(&device_id).unwrap().unwrap().state, "off");
        assert_eq!(server.get_device(&device_id).await.unwrap().state, "on");

        let retry = server.transition(&device_id, "flip-on").await;
        assert!(matches!(retry, Err(RuntimeError::InvalidTransition { .. })));

        store.reject_updates(false);
        server.transition(&device_id, "flip-off").await.unwrap();
        assert_eq!(store.get_device(&device_id).unwrap().unwrap().state, "off");
    }

    struct OrderedScout {
        label: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Discoverable for OrderedScout {
        fn name(&self) -> &str {
            self.label
        }

        async fn init(&self, registry: Arc<dyn DeviceRegistry>) -> Result<()> {
            self.order.lock().push(self.label);
            registry.discover(switch(self.label)).await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn start_runs_scouts_in_order() {
        let (server, _dir) = setup();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second"] {
            server.register_scout(Arc::new(OrderedScout {
                label,
                order: Arc::clone(&order),
            }));
        }

        server.start().await.unwrap();

        assert_eq!(*order.lock(), vec!["first", "second"]);
        assert_eq!(server.device_count(), 2);
    }
}
