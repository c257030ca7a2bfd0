//! Scout behavior against a recording registry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use boneled_core::{DeviceId, PinId};
use boneled_hal::{Level, MockBoard, PinIo, PinMode};
use boneled_led::{LedScout, LED_DEVICE_TYPE, PIN_PROPERTY};
use boneled_runtime::{
    DeviceInstance, DeviceQuery, DeviceRecord, DeviceRegistry, Discoverable, Result, RuntimeError,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Find(String),
    Provision { pin: String, device_id: DeviceId },
    Discover { pin: String },
}

#[derive(Default)]
struct FakeRegistry {
    records: Mutex<Vec<DeviceRecord>>,
    failing_pins: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
    devices: Mutex<Vec<Box<dyn DeviceInstance>>>,
}

impl FakeRegistry {
    fn with_record(self, record: DeviceRecord) -> Self {
        self.records.lock().push(record);
        self
    }

    fn failing_for(self, pin: &str) -> Self {
        self.failing_pins.lock().insert(pin.to_string());
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn registrations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::Find(_)))
            .collect()
    }

    fn device_states(&self) -> Vec<String> {
        self.devices
            .lock()
            .iter()
            .map(|d| d.state().to_string())
            .collect()
    }
}

fn pin_of(device: &dyn DeviceInstance) -> String {
    device
        .properties()
        .get(PIN_PROPERTY)
        .cloned()
        .unwrap_or_default()
}

#[async_trait]
impl DeviceRegistry for FakeRegistry {
    async fn find(&self, query: &DeviceQuery) -> Result<Vec<DeviceRecord>> {
        let pin = query
            .properties
            .get(PIN_PROPERTY)
            .cloned()
            .unwrap_or_default();
        self.calls.lock().push(Call::Find(pin.clone()));

        if self.failing_pins.lock().contains(&pin) {
            return Err(RuntimeError::Internal("registry unavailable".into()));
        }

        Ok(self
            .records
            .lock()
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }

    async fn provision(
        &self,
        record: DeviceRecord,
        device: Box<dyn DeviceInstance>,
    ) -> Result<DeviceId> {
        self.calls.lock().push(Call::Provision {
            pin: pin_of(device.as_ref()),
            device_id: record.device_id,
        });
        self.devices.lock().push(device);
        Ok(record.device_id)
    }

    async fn discover(&self, device: Box<dyn DeviceInstance>) -> Result<DeviceId> {
        self.calls.lock().push(Call::Discover {
            pin: pin_of(device.as_ref()),
        });
        self.devices.lock().push(device);
        Ok(DeviceId::generate())
    }
}

fn pin(label: &str) -> PinId {
    PinId::new(label).unwrap()
}

fn scout(board: &Arc<MockBoard>, pins: &[&str]) -> LedScout {
    let io: Arc<dyn PinIo> = Arc::clone(board) as Arc<dyn PinIo>;
    LedScout::new(pins.iter().map(|p| pin(p)), io)
}

fn led_record(pin: &str, state: &str) -> DeviceRecord {
    DeviceRecord::new(LED_DEVICE_TYPE, state)
        .with_name(pin)
        .with_property(PIN_PROPERTY, pin)
}

/// Wait until the registry has seen `count` provision/discover calls.
async fn wait_for_registrations(registry: &FakeRegistry, count: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while registry.registrations().len() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for registrations");
}

/// Wait until the registry has been queried for `count` pins.
async fn wait_for_finds(registry: &FakeRegistry, count: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while registry
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Find(_)))
            .count()
            < count
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for registry lookups");
}

#[tokio::test]
async fn discovers_unregistered_pin() {
    let board = Arc::new(MockBoard::new());
    let registry = Arc::new(FakeRegistry::default());

    scout(&board, &["P9_12"])
        .init(registry.clone())
        .await
        .unwrap();
    wait_for_registrations(&registry, 1).await;

    assert_eq!(
        registry.registrations(),
        vec![Call::Discover {
            pin: "P9_12".into()
        }]
    );
    assert_eq!(board.mode(&pin("P9_12")), Some(PinMode::Output));
    assert_eq!(board.writes(&pin("P9_12")), vec![Level::Low]);
}

#[tokio::test]
async fn provisions_registered_pin_and_never_discovers() {
    let board = Arc::new(MockBoard::new());
    let record = led_record("P9_12", "on");
    let registry = Arc::new(FakeRegistry::default().with_record(record.clone()));

    scout(&board, &["P9_12"])
        .init(registry.clone())
        .await
        .unwrap();
    wait_for_registrations(&registry, 1).await;
    // Give a stray discover the chance to show up
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        registry.registrations(),
        vec![Call::Provision {
            pin: "P9_12".into(),
            device_id: record.device_id,
        }]
    );
    // Restored "on" is reset to the electrical baseline
    assert_eq!(registry.device_states(), vec!["off".to_string()]);
    assert_eq!(board.writes(&pin("P9_12")), vec![Level::Low]);
}

#[tokio::test]
async fn ignores_records_for_other_pins() {
    let board = Arc::new(MockBoard::new());
    let registry = Arc::new(FakeRegistry::default().with_record(led_record("P9_11", "off")));

    scout(&board, &["P9_12"])
        .init(registry.clone())
        .await
        .unwrap();
    wait_for_registrations(&registry, 1).await;

    assert_eq!(
        registry.registrations(),
        vec![Call::Discover {
            pin: "P9_12".into()
        }]
    );
}

#[tokio::test]
async fn lookup_failure_does_not_block_other_pins() {
    let board = Arc::new(MockBoard::new());
    let registry = Arc::new(FakeRegistry::default().failing_for("P9_12"));

    scout(&board, &["P9_12", "P9_11"])
        .init(registry.clone())
        .await
        .unwrap();
    wait_for_finds(&registry, 2).await;
    wait_for_registrations(&registry, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        registry.registrations(),
        vec![Call::Discover {
            pin: "P9_11".into()
        }]
    );
    assert!(board.writes(&pin("P9_12")).is_empty());
    assert_eq!(board.writes(&pin("P9_11")), vec![Level::Low]);
}

#[tokio::test]
async fn hardware_failure_skips_only_that_pin() {
    let board = Arc::new(MockBoard::new());
    board.fail_writes(&pin("P9_12"));
    let registry = Arc::new(FakeRegistry::default());

    scout(&board, &["P9_12", "P9_11"])
        .init(registry.clone())
        .await
        .unwrap();
    wait_for_registrations(&registry, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        registry.registrations(),
        vec![Call::Discover {
            pin: "P9_11".into()
        }]
    );
}

#[tokio::test]
async fn init_returns_before_platform_is_ready() {
    let board = Arc::new(MockBoard::gated());
    let registry = Arc::new(FakeRegistry::default());

    scout(&board, &["P9_12", "P9_11"])
        .init(registry.clone())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(registry.calls().is_empty());
    assert!(board.events().is_empty());

    board.release_platform();
    wait_for_registrations(&registry, 2).await;

    let mut pins: Vec<_> = registry
        .registrations()
        .into_iter()
        .map(|call| match call {
            Call::Discover { pin } | Call::Provision { pin, .. } => pin,
            Call::Find(pin) => pin,
        })
        .collect();
    pins.sort();
    assert_eq!(pins, vec!["P9_11".to_string(), "P9_12".to_string()]);
}

#[tokio::test]
async fn platform_failure_registers_nothing() {
    let board = Arc::new(MockBoard::new());
    board.fail_platform("no device tree");
    let registry = Arc::new(FakeRegistry::default());

    scout(&board, &["P9_12"])
        .init(registry.clone())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(registry.calls().is_empty());
    assert!(board.events().is_empty());
}

#[tokio::test]
async fn repeated_pin_is_registered_once() {
    let board = Arc::new(MockBoard::new());
    let registry = Arc::new(FakeRegistry::default());

    scout(&board, &["P9_12", "P9_12"])
        .init(registry.clone())
        .await
        .unwrap();
    wait_for_registrations(&registry, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        registry.calls(),
        vec![
            Call::Find("P9_12".into()),
            Call::Discover {
                pin: "P9_12".into()
            },
        ]
    );
    assert_eq!(board.writes(&pin("P9_12")), vec![Level::Low]);
}
