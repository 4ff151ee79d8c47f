//! Session supervisor — owns the sync/live/reconnect lifecycle.
//!
//! ```text
//! Disconnected → Syncing → Live ─┬─ session error ─→ Reconnecting → (back-off) → Syncing
//!                                ├─ bus restored ──→ Reconnecting → Syncing (same stream)
//!                                └─ shutdown ──────→ Stopped
//! ```
//!
//! The supervisor is the single consumer of the session event stream. Events
//! are published one at a time, so two changes of the same entity reach the
//! bus in the order the session reported them.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use hmip_bridge_domain::command::COMMAND_PATTERNS;
use hmip_bridge_domain::error::BridgeError;
use hmip_bridge_domain::event::{ChangeEvent, SessionEvent};

use crate::ports::{
    AutomationSession, BusStatus, EventOptions, EventStream, InboundMessage, MessageBus, Qos,
};
use crate::services::command_router::CommandRouter;
use crate::services::publisher::{OutboundPublisher, PublishReport};

/// Lifecycle state of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Subscribing to commands and republishing every entity.
    Syncing,
    /// Mirroring change events.
    Live,
    /// Tearing down after a failure, before the next sync.
    Reconnecting,
    Stopped,
}

/// Reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Wait after the first failure. Doubles on each consecutive failure.
    pub reconnect_delay: Duration,
    /// Upper bound for the wait.
    pub max_reconnect_delay: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(60),
        }
    }
}

enum LiveExit {
    Shutdown,
    SessionLost,
}

/// Drives the session and the publisher, and spawns the command router.
pub struct SessionSupervisor<S, B> {
    session: Arc<S>,
    publisher: OutboundPublisher<B>,
    bus: Option<B>,
    config: SupervisorConfig,
    state: watch::Sender<SessionState>,
}

impl<S, B> SessionSupervisor<S, B>
where
    S: AutomationSession + 'static,
    B: MessageBus + Clone,
{
    #[must_use]
    pub fn new(session: Arc<S>, publisher: OutboundPublisher<B>, config: SupervisorConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            session,
            publisher,
            bus: None,
            config,
            state,
        }
    }

    /// Attach the bus used for publishing and command subscriptions.
    pub fn attach_bus(&mut self, bus: B) {
        self.publisher.attach(bus.clone());
        self.bus = Some(bus);
    }

    /// Watch the lifecycle state.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: SessionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::debug!(from = ?previous, to = ?state, "session state changed");
        }
    }

    /// Publish every group, device, and the home object.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot cannot be read from the session.
    /// Publish failures are only counted in the report.
    pub async fn full_sync(&self) -> Result<PublishReport, BridgeError> {
        let groups = self.session.current_groups().await?;
        let devices = self.session.current_devices().await?;
        let home = self.session.current_home().await?;

        let mut report = PublishReport::default();
        for entity in groups.iter().chain(devices.iter()).chain(home.iter()) {
            report += self.publisher.publish_entity(entity).await;
        }

        tracing::info!(
            groups = groups.len(),
            devices = devices.len(),
            published = report.published,
            failed = report.failed,
            skipped = report.skipped,
            "full sync done"
        );
        Ok(report)
    }

    async fn subscribe_commands(&self) {
        let Some(bus) = &self.bus else {
            tracing::debug!("no bus client available, skipping command subscriptions");
            return;
        };
        for pattern in COMMAND_PATTERNS {
            match bus.subscribe(pattern, Qos::AtMostOnce).await {
                Ok(()) => tracing::debug!(%pattern, "subscribed"),
                Err(err) => tracing::error!(%pattern, error = %err, "failed to subscribe"),
            }
        }
    }

    async fn sync(&self) -> Result<PublishReport, BridgeError> {
        self.set_state(SessionState::Syncing);
        self.subscribe_commands().await;
        self.full_sync().await
    }

    async fn start_session(&self) -> Result<EventStream, BridgeError> {
        self.sync().await?;
        self.session
            .enable_events(EventOptions {
                reconnect_on_error: false,
            })
            .await
    }

    /// Start the session while keeping `bus_status` drained.
    ///
    /// A `Restored` notice seen before the session is up means part of the
    /// sync may have been skipped, so one more resync runs once events are
    /// enabled.
    async fn start_draining(
        &self,
        bus_status: &mut mpsc::Receiver<BusStatus>,
    ) -> Result<EventStream, BridgeError> {
        let mut restored = false;
        let start = self.start_session();
        tokio::pin!(start);
        let events = loop {
            tokio::select! {
                result = &mut start => break result?,
                Some(status) = bus_status.recv() => {
                    restored |= status == BusStatus::Restored;
                    tracing::debug!(?status, "bus status during sync");
                }
            }
        };
        if restored {
            tracing::info!("bus restored during sync, resyncing");
            self.sync().await?;
        }
        Ok(events)
    }

    /// Wait `delay`, returning `false` if shutdown comes first. Link
    /// notices are dropped since a full sync follows anyway.
    async fn back_off<F>(
        &self,
        delay: Duration,
        bus_status: &mut mpsc::Receiver<BusStatus>,
        mut shutdown: Pin<&mut F>,
    ) -> bool
    where
        F: Future<Output = ()>,
    {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = shutdown.as_mut() => return false,
                () = &mut sleep => return true,
                Some(status) = bus_status.recv() => {
                    tracing::debug!(?status, "bus status during back-off");
                }
            }
        }
    }

    async fn forward(&self, change: &ChangeEvent) {
        if !change.kind.is_mirrored() {
            tracing::debug!(kind = change.kind.as_str(), "ignoring event");
            return;
        }
        tracing::debug!(
            kind = change.kind.as_str(),
            id = change.entity.id(),
            age = ?change.age(),
            "forwarding change"
        );
        self.publisher.publish_entity(&change.entity).await;
    }

    async fn live<F>(
        &self,
        events: &mut EventStream,
        bus_status: &mut mpsc::Receiver<BusStatus>,
        mut shutdown: Pin<&mut F>,
    ) -> LiveExit
    where
        F: Future<Output = ()>,
    {
        loop {
            tokio::select! {
                () = shutdown.as_mut() => return LiveExit::Shutdown,
                event = events.recv() => match event {
                    Some(SessionEvent::Change(change)) => self.forward(&change).await,
                    Some(SessionEvent::Error(err)) => {
                        tracing::error!(error = %err, "session event stream failed");
                        return LiveExit::SessionLost;
                    }
                    None => {
                        tracing::error!("session event stream closed");
                        return LiveExit::SessionLost;
                    }
                },
                Some(status) = bus_status.recv() => match status {
                    BusStatus::Lost(reason) => tracing::warn!(%reason, "bus connection lost"),
                    BusStatus::Restored => {
                        tracing::info!("bus connection restored, resyncing");
                        self.set_state(SessionState::Reconnecting);
                        if let Err(err) = self.sync().await {
                            tracing::error!(error = %err, "resync failed");
                            return LiveExit::SessionLost;
                        }
                        self.set_state(SessionState::Live);
                    }
                },
            }
        }
    }

    /// Run until `shutdown` resolves.
    ///
    /// The command router is spawned once here and consumes `inbound` for the
    /// lifetime of the process. `bus_status` carries link notices from the
    /// bus adapter.
    pub async fn run<F>(
        self,
        inbound: mpsc::Receiver<InboundMessage>,
        mut bus_status: mpsc::Receiver<BusStatus>,
        shutdown: F,
    ) where
        F: Future<Output = ()>,
    {
        tokio::spawn(CommandRouter::new(Arc::clone(&self.session)).run(inbound));
        tokio::pin!(shutdown);

        let mut delay = self.config.reconnect_delay;
        loop {
            match self.start_draining(&mut bus_status).await {
                Ok(mut events) => {
                    self.set_state(SessionState::Live);
                    delay = self.config.reconnect_delay;
                    tracing::info!("session live");
                    match self
                        .live(&mut events, &mut bus_status, shutdown.as_mut())
                        .await
                    {
                        LiveExit::Shutdown => break,
                        LiveExit::SessionLost => {}
                    }
                }
                Err(err) => tracing::error!(error = %err, "session sync failed"),
            }

            self.set_state(SessionState::Reconnecting);
            self.session.disable_events().await;
            tracing::info!(?delay, "reconnecting after back-off");
            if !self
                .back_off(delay, &mut bus_status, shutdown.as_mut())
                .await
            {
                break;
            }
            delay = (delay * 2).min(self.config.max_reconnect_delay);
        }

        tracing::info!("shutting down");
        self.session.disable_events().await;
        self.set_state(SessionState::Stopped);
    }
}
