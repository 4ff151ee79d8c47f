//! In-memory automation session.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use hmip_bridge_app::ports::{AutomationSession, EventOptions, EventStream};
use hmip_bridge_domain::command::DoorCommand;
use hmip_bridge_domain::entity::state::DoorState;
use hmip_bridge_domain::entity::{Entity, EntityCategory};
use hmip_bridge_domain::error::{BridgeError, TransportError};
use hmip_bridge_domain::event::{ChangeEvent, SessionEvent};

use crate::error::VirtualSessionError;
use crate::fixture::HomeFixture;

const EVENT_CAPACITY: usize = 64;

struct Subscription {
    tx: mpsc::Sender<SessionEvent>,
    options: EventOptions,
}

/// A simulated home that behaves like the platform session.
///
/// Commands mutate the in-memory snapshot and emit the matching
/// `*_CHANGED` event, so writes loop back through the outbound path.
pub struct VirtualSession {
    home: Mutex<HomeFixture>,
    subscription: Mutex<Option<Subscription>>,
}

impl VirtualSession {
    #[must_use]
    pub fn new(fixture: HomeFixture) -> Self {
        Self {
            home: Mutex::new(fixture),
            subscription: Mutex::new(None),
        }
    }

    /// Load the session from a TOML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, VirtualSessionError> {
        HomeFixture::from_file(path).map(Self::new)
    }

    /// Session serving the bundled demo home.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled fixture is broken.
    pub fn demo() -> Result<Self, VirtualSessionError> {
        HomeFixture::demo().map(Self::new)
    }

    /// Replace an entity's snapshot as if the device had reported a change.
    ///
    /// # Errors
    ///
    /// Returns an error if no entity with that id exists in the entity's
    /// category.
    pub async fn report_change(&self, entity: Entity) -> Result<(), VirtualSessionError> {
        {
            let mut home = self.lock_home();
            let slot = find_mut(&mut home, entity.category(), entity.id())?;
            *slot = entity.clone();
        }
        self.emit(entity).await;
        Ok(())
    }

    /// Fail the event socket.
    ///
    /// Without `reconnect_on_error` the stream yields the error and then
    /// closes. With it the session recovers on its own and the stream stays
    /// open.
    pub async fn inject_transport_error(&self) {
        let recovers = self
            .lock_subscription()
            .as_ref()
            .is_some_and(|sub| sub.options.reconnect_on_error);
        if recovers {
            tracing::info!("simulated socket failure, recovered by the session");
            return;
        }
        let failed = self.lock_subscription().take();
        let Some(sub) = failed else {
            tracing::debug!("simulated socket failure without open stream");
            return;
        };
        tracing::info!("simulated socket failure");
        let error = TransportError::new("simulated socket failure");
        if sub.tx.send(SessionEvent::Error(error)).await.is_err() {
            tracing::debug!("event stream dropped");
        }
    }

    /// Whether an event stream is currently open.
    #[must_use]
    pub fn events_enabled(&self) -> bool {
        self.lock_subscription().is_some()
    }

    fn lock_home(&self) -> MutexGuard<'_, HomeFixture> {
        self.home.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscription(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn emit(&self, entity: Entity) {
        let tx = self.lock_subscription().as_ref().map(|sub| sub.tx.clone());
        let Some(tx) = tx else {
            tracing::debug!(id = entity.id(), "events disabled, change not emitted");
            return;
        };
        let event = ChangeEvent::changed(entity);
        if tx.send(SessionEvent::Change(event)).await.is_err() {
            tracing::debug!("event stream dropped");
        }
    }
}

fn find_mut<'a>(
    home: &'a mut HomeFixture,
    category: EntityCategory,
    id: &str,
) -> Result<&'a mut Entity, VirtualSessionError> {
    match category {
        EntityCategory::Groups => home
            .groups
            .iter_mut()
            .find(|group| group.id() == id)
            .ok_or_else(|| VirtualSessionError::UnknownGroup(id.to_string())),
        EntityCategory::Devices => home
            .devices
            .iter_mut()
            .find(|device| device.id() == id)
            .ok_or_else(|| VirtualSessionError::UnknownDevice(id.to_string())),
        EntityCategory::Home => home.home.as_mut().ok_or(VirtualSessionError::NoHome),
    }
}

fn not_writable(entity: &Entity) -> VirtualSessionError {
    VirtualSessionError::NotWritable {
        id: entity.id().to_string(),
        kind: entity.kind_name().to_string(),
    }
}

impl AutomationSession for VirtualSession {
    async fn current_groups(&self) -> Result<Vec<Entity>, BridgeError> {
        Ok(self.lock_home().groups.clone())
    }

    async fn current_devices(&self) -> Result<Vec<Entity>, BridgeError> {
        Ok(self.lock_home().devices.clone())
    }

    async fn current_home(&self) -> Result<Option<Entity>, BridgeError> {
        Ok(self.lock_home().home.clone())
    }

    async fn enable_events(&self, options: EventOptions) -> Result<EventStream, BridgeError> {
        let (tx, rx) = mpsc::channel(EVENT_CAPACITY);
        let previous = self
            .lock_subscription()
            .replace(Subscription { tx, options });
        if previous.is_some() {
            tracing::debug!("replacing open event stream");
        }
        tracing::info!(
            reconnect_on_error = options.reconnect_on_error,
            "events enabled"
        );
        Ok(rx)
    }

    async fn disable_events(&self) {
        if self.lock_subscription().take().is_some() {
            tracing::info!("events disabled");
        }
    }

    async fn set_group_set_point(&self, group_id: &str, set_point: f64) -> Result<(), BridgeError> {
        let changed = {
            let mut home = self.lock_home();
            let group = find_mut(&mut home, EntityCategory::Groups, group_id)?;
            match &mut *group {
                Entity::HeatingGroup(heating) => heating.set_point_temperature = set_point,
                other => return Err(not_writable(other).into()),
            }
            group.clone()
        };
        tracing::info!(group = group_id, set_point, "set point changed");
        self.emit(changed).await;
        Ok(())
    }

    async fn send_door_command(
        &self,
        device_id: &str,
        command: DoorCommand,
    ) -> Result<(), BridgeError> {
        let changed = {
            let mut home = self.lock_home();
            let device = find_mut(&mut home, EntityCategory::Devices, device_id)?;
            let drive = match &mut *device {
                Entity::GateDrive(drive) => drive,
                other => return Err(not_writable(other).into()),
            };
            match command {
                DoorCommand::Open => drive.door_state = Some(DoorState::Open),
                DoorCommand::Close => drive.door_state = Some(DoorState::Closed),
                DoorCommand::PartialOpen => {
                    drive.door_state = Some(DoorState::VentilationPosition);
                }
                DoorCommand::Stop => {}
            }
            device.clone()
        };
        tracing::info!(device = device_id, %command, "door command applied");
        self.emit(changed).await;
        Ok(())
    }

    async fn set_security_zones(
        &self,
        internal_active: bool,
        external_active: bool,
    ) -> Result<(), BridgeError> {
        let changed = {
            let mut home = self.lock_home();
            let entity = find_mut(&mut home, EntityCategory::Home, "")?;
            match &mut *entity {
                Entity::HomeSecurityState(security) => {
                    security.internal_active = internal_active;
                    security.external_active = external_active;
                }
                other => return Err(not_writable(other).into()),
            }
            entity.clone()
        };
        tracing::info!(internal_active, external_active, "security zones changed");
        self.emit(changed).await;
        Ok(())
    }
}
