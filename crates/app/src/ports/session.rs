//! Automation session port — the authenticated connection to the platform.
//!
//! The session owns every entity; the bridge only reads snapshots and issues
//! command calls. Login, token handling, and socket internals stay behind
//! this trait.

use std::future::Future;

use tokio::sync::mpsc;

use hmip_bridge_domain::command::DoorCommand;
use hmip_bridge_domain::entity::Entity;
use hmip_bridge_domain::error::BridgeError;
use hmip_bridge_domain::event::SessionEvent;

/// Stream of change events. Owned by a single consumer (the supervisor).
pub type EventStream = mpsc::Receiver<SessionEvent>;

/// Options applied when the event socket is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOptions {
    /// Let the session reconnect its socket on its own after an error.
    ///
    /// The supervisor always passes `false` and drives reconnects itself.
    pub reconnect_on_error: bool,
}

/// Connection to the home-automation platform.
pub trait AutomationSession: Send + Sync {
    /// Snapshot of every group.
    fn current_groups(&self) -> impl Future<Output = Result<Vec<Entity>, BridgeError>> + Send;

    /// Snapshot of every device.
    fn current_devices(&self) -> impl Future<Output = Result<Vec<Entity>, BridgeError>> + Send;

    /// Snapshot of the home security state, if the platform reported one.
    fn current_home(&self) -> impl Future<Output = Result<Option<Entity>, BridgeError>> + Send;

    /// Find a group by id.
    fn search_group(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, BridgeError>> + Send {
        async move {
            let groups = self.current_groups().await?;
            Ok(groups.into_iter().find(|group| group.id() == id))
        }
    }

    /// Find a device by id.
    fn search_device(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, BridgeError>> + Send {
        async move {
            let devices = self.current_devices().await?;
            Ok(devices.into_iter().find(|device| device.id() == id))
        }
    }

    /// Open the event socket and return its stream.
    ///
    /// Calling this again after [`disable_events`](Self::disable_events)
    /// opens a fresh stream; the previous one is closed.
    fn enable_events(
        &self,
        options: EventOptions,
    ) -> impl Future<Output = Result<EventStream, BridgeError>> + Send;

    /// Close the event socket. Idempotent.
    fn disable_events(&self) -> impl Future<Output = ()> + Send;

    /// Set the target temperature of a heating group.
    fn set_group_set_point(
        &self,
        group_id: &str,
        set_point: f64,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Send a door command to a gate drive.
    fn send_door_command(
        &self,
        device_id: &str,
        command: DoorCommand,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Arm or disarm the two security zones of the home.
    fn set_security_zones(
        &self,
        internal_active: bool,
        external_active: bool,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
