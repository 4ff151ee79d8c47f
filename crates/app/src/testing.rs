//! In-memory port implementations shared by the use-case tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{mpsc, watch};

use hmip_bridge_domain::command::DoorCommand;
use hmip_bridge_domain::entity::state::{ClimateControlMode, DoorState, WindowState};
use hmip_bridge_domain::entity::{
    Entity, GateDrive, HeatingGroup, HeatingThermostat, HomeSecurityState, SmokeDetector,
    WindowSensor,
};
use hmip_bridge_domain::error::{BridgeError, PlatformRejection, TransportError};
use hmip_bridge_domain::event::SessionEvent;

use crate::ports::{AutomationSession, EventOptions, EventStream, MessageBus, Qos};
use crate::supervisor::SessionState;

// ── Fixtures ───────────────────────────────────────────────────────

pub(crate) fn heating_group(id: &str) -> Entity {
    Entity::HeatingGroup(HeatingGroup {
        id: id.into(),
        label: format!("Room {id}"),
        set_point_temperature: 20.0,
        actual_temperature: Some(19.5),
        humidity: Some(48.0),
        valve_position: Some(0.25),
        window_state: Some(WindowState::Closed),
        control_mode: Some(ClimateControlMode::Automatic),
    })
}

pub(crate) fn thermostat(id: &str) -> Entity {
    Entity::HeatingThermostat(HeatingThermostat {
        id: id.into(),
        low_battery: Some(false),
        set_point_temperature: 20.0,
        valve_actual_temperature: Some(19.0),
        valve_position: Some(0.25),
    })
}

pub(crate) fn window_sensor(id: &str) -> Entity {
    Entity::WindowSensor(WindowSensor {
        id: id.into(),
        model: None,
        low_battery: Some(false),
        window_state: Some(WindowState::Closed),
    })
}

pub(crate) fn gate_drive(id: &str) -> Entity {
    Entity::GateDrive(GateDrive {
        id: id.into(),
        door_state: Some(DoorState::Closed),
    })
}

pub(crate) fn smoke_detector(id: &str) -> Entity {
    Entity::SmokeDetector(SmokeDetector {
        id: id.into(),
        low_battery: Some(false),
    })
}

pub(crate) fn home(internal_active: bool, external_active: bool) -> Entity {
    Entity::HomeSecurityState(HomeSecurityState {
        id: "home".into(),
        internal_active,
        external_active,
    })
}

// ── Session ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionCall {
    SetPoint(String, f64),
    Door(String, DoorCommand),
    Zones(bool, bool),
}

#[derive(Default)]
pub(crate) struct FakeSession {
    groups: Vec<Entity>,
    devices: Vec<Entity>,
    home: Option<Entity>,
    reject_with: Option<String>,
    calls: Mutex<Vec<SessionCall>>,
    event_senders: Mutex<Vec<mpsc::Sender<SessionEvent>>>,
    enable_options: Mutex<Vec<EventOptions>>,
    disabled: AtomicUsize,
    states_at_disable: Mutex<Vec<SessionState>>,
    observer: Mutex<Option<watch::Receiver<SessionState>>>,
    fail_snapshots: AtomicBool,
}

impl FakeSession {
    pub(crate) fn new(groups: Vec<Entity>, devices: Vec<Entity>, home: Option<Entity>) -> Self {
        Self {
            groups,
            devices,
            home,
            ..Self::default()
        }
    }

    pub(crate) fn rejecting(mut self, reason: &str) -> Self {
        self.reject_with = Some(reason.to_string());
        self
    }

    pub(crate) fn observe(&self, state: watch::Receiver<SessionState>) {
        *self.observer.lock().unwrap() = Some(state);
    }

    pub(crate) fn fail_snapshots(&self, fail: bool) {
        self.fail_snapshots.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn enable_count(&self) -> usize {
        self.enable_options.lock().unwrap().len()
    }

    pub(crate) fn enable_options(&self) -> Vec<EventOptions> {
        self.enable_options.lock().unwrap().clone()
    }

    pub(crate) fn disable_count(&self) -> usize {
        self.disabled.load(Ordering::SeqCst)
    }

    pub(crate) fn states_at_disable(&self) -> Vec<SessionState> {
        self.states_at_disable.lock().unwrap().clone()
    }

    /// Sender feeding the most recently enabled event stream.
    pub(crate) fn events(&self) -> mpsc::Sender<SessionEvent> {
        self.event_senders
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("events not enabled")
    }

    fn snapshot(&self, entities: &[Entity]) -> Result<Vec<Entity>, BridgeError> {
        if self.fail_snapshots.load(Ordering::SeqCst) {
            return Err(TransportError::new("session unavailable").into());
        }
        Ok(entities.to_vec())
    }

    fn record(&self, call: SessionCall) -> Result<(), BridgeError> {
        self.calls.lock().unwrap().push(call);
        match &self.reject_with {
            Some(reason) => Err(PlatformRejection::new(reason.clone()).into()),
            None => Ok(()),
        }
    }
}

impl AutomationSession for FakeSession {
    async fn current_groups(&self) -> Result<Vec<Entity>, BridgeError> {
        self.snapshot(&self.groups)
    }

    async fn current_devices(&self) -> Result<Vec<Entity>, BridgeError> {
        self.snapshot(&self.devices)
    }

    async fn current_home(&self) -> Result<Option<Entity>, BridgeError> {
        Ok(self.home.clone())
    }

    async fn enable_events(&self, options: EventOptions) -> Result<EventStream, BridgeError> {
        let (tx, rx) = mpsc::channel(16);
        self.event_senders.lock().unwrap().push(tx);
        self.enable_options.lock().unwrap().push(options);
        Ok(rx)
    }

    async fn disable_events(&self) {
        self.disabled.fetch_add(1, Ordering::SeqCst);
        if let Some(state) = self.observer.lock().unwrap().as_ref() {
            self.states_at_disable.lock().unwrap().push(*state.borrow());
        }
    }

    async fn set_group_set_point(&self, group_id: &str, set_point: f64) -> Result<(), BridgeError> {
        self.record(SessionCall::SetPoint(group_id.to_string(), set_point))
    }

    async fn send_door_command(
        &self,
        device_id: &str,
        command: DoorCommand,
    ) -> Result<(), BridgeError> {
        self.record(SessionCall::Door(device_id.to_string(), command))
    }

    async fn set_security_zones(
        &self,
        internal_active: bool,
        external_active: bool,
    ) -> Result<(), BridgeError> {
        self.record(SessionCall::Zones(internal_active, external_active))
    }
}

// ── Bus ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Published {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
    pub qos: Qos,
}

pub(crate) struct RecordingBus {
    connected: AtomicBool,
    published: Mutex<Vec<Published>>,
    subscriptions: Mutex<Vec<String>>,
    states_at_subscribe: Mutex<Vec<SessionState>>,
    failing_topics: Mutex<Vec<String>>,
    observer: Mutex<Option<watch::Receiver<SessionState>>>,
}

impl Default for RecordingBus {
    fn default() -> Self {
        Self {
            connected: AtomicBool::new(true),
            published: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            states_at_subscribe: Mutex::new(Vec::new()),
            failing_topics: Mutex::new(Vec::new()),
            observer: Mutex::new(None),
        }
    }
}

impl RecordingBus {
    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub(crate) fn fail_on(&self, topic: &str) {
        self.failing_topics.lock().unwrap().push(topic.to_string());
    }

    pub(crate) fn observe(&self, state: watch::Receiver<SessionState>) {
        *self.observer.lock().unwrap() = Some(state);
    }

    pub(crate) fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    pub(crate) fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub(crate) fn states_at_subscribe(&self) -> Vec<SessionState> {
        self.states_at_subscribe.lock().unwrap().clone()
    }
}

impl MessageBus for RecordingBus {
    async fn publish(
        &self,
        topic: &str,
        payload: String,
        retain: bool,
        qos: Qos,
    ) -> Result<(), BridgeError> {
        if self.failing_topics.lock().unwrap().iter().any(|t| t == topic) {
            return Err(TransportError::new("publish refused").into());
        }
        self.published.lock().unwrap().push(Published {
            topic: topic.to_string(),
            payload,
            retain,
            qos,
        });
        Ok(())
    }

    async fn subscribe(&self, pattern: &str, _qos: Qos) -> Result<(), BridgeError> {
        self.subscriptions.lock().unwrap().push(pattern.to_string());
        if let Some(state) = self.observer.lock().unwrap().as_ref() {
            self.states_at_subscribe.lock().unwrap().push(*state.borrow());
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Yield to the runtime until `condition` holds, failing after a while.
pub(crate) async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    panic!("condition not reached in time");
}
