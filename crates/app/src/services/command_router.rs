//! Command router — turns inbound bus messages into session calls.
//!
//! Every failure is caught here and logged; nothing a sender publishes can
//! stop the router or reach the event loop.

use std::sync::Arc;

use tokio::sync::mpsc;

use hmip_bridge_domain::command::{Command, CommandCategory, DoorCommand, parse_set_point};
use hmip_bridge_domain::entity::{AlarmMode, Entity, Writable};
use hmip_bridge_domain::error::{BridgeError, NotFoundError, ParseError, UnsupportedOperationError};

use crate::ports::{AutomationSession, InboundMessage};

/// What happened to one inbound message.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The session accepted the command.
    Dispatched,
    /// The category has no handler.
    Ignored,
    /// The command was rejected along the way; already logged.
    Dropped(BridgeError),
}

/// Dispatches commands from the bus to the automation session.
pub struct CommandRouter<S> {
    session: Arc<S>,
}

impl<S: AutomationSession> CommandRouter<S> {
    #[must_use]
    pub fn new(session: Arc<S>) -> Self {
        Self { session }
    }

    /// Route messages until the inbound channel closes.
    pub async fn run(self, mut inbound: mpsc::Receiver<InboundMessage>) {
        while let Some(message) = inbound.recv().await {
            match std::str::from_utf8(&message.payload) {
                Ok(payload) => {
                    self.route(&message.topic, payload).await;
                }
                Err(_) => {
                    log_dropped(&message.topic, &ParseError::InvalidEncoding.into());
                }
            }
        }
        tracing::debug!("inbound channel closed, command router stopping");
    }

    /// Parse and dispatch a single command.
    pub async fn route(&self, topic: &str, payload: &str) -> RouteOutcome {
        tracing::info!(%topic, %payload, "command received");

        let command = match Command::parse(topic, payload) {
            Ok(command) => command,
            Err(err) => return dropped(topic, err.into()),
        };

        let result = match &command.category {
            CommandCategory::Groups => self.update_group(&command).await,
            CommandCategory::Devices => self.update_device(&command).await,
            CommandCategory::Home => self.update_home(&command).await,
            CommandCategory::Other(category) => {
                tracing::warn!(%category, "not yet implemented");
                return RouteOutcome::Ignored;
            }
        };

        match result {
            Ok(()) => RouteOutcome::Dispatched,
            Err(err) => dropped(topic, err),
        }
    }

    async fn update_group(&self, command: &Command) -> Result<(), BridgeError> {
        let group = self
            .session
            .search_group(&command.id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "group",
                id: command.id.clone(),
            })?;
        require(&group, &command.category, Writable::HeatingSetPoint)?;

        let set_point = parse_set_point(&command.value)?;
        tracing::info!(group = %command.id, set_point, "updating heating group set point");
        self.session
            .set_group_set_point(&command.id, set_point)
            .await
    }

    async fn update_device(&self, command: &Command) -> Result<(), BridgeError> {
        let device = self
            .session
            .search_device(&command.id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "device",
                id: command.id.clone(),
            })?;
        require(&device, &command.category, Writable::DoorCommand)?;

        let door_command: DoorCommand = command.value.parse()?;
        tracing::info!(device = %command.id, command = %door_command, "sending door command");
        self.session
            .send_door_command(&command.id, door_command)
            .await
    }

    async fn update_home(&self, command: &Command) -> Result<(), BridgeError> {
        if command.subtype != "alarm" {
            return Err(UnsupportedOperationError {
                target: command.category.to_string(),
                kind: command.subtype.clone(),
            }
            .into());
        }

        let home = self
            .session
            .current_home()
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "home",
                id: command.id.clone(),
            })?;
        require(&home, &command.category, Writable::SecurityZones)?;

        let mode = AlarmMode::from_payload(&command.value);
        let (internal_active, external_active) = mode.zones();
        tracing::info!(%mode, internal_active, external_active, "updating alarm zones");
        self.session
            .set_security_zones(internal_active, external_active)
            .await
    }
}

fn require(
    entity: &Entity,
    category: &CommandCategory,
    expected: Writable,
) -> Result<(), UnsupportedOperationError> {
    if entity.writable() == Some(expected) {
        Ok(())
    } else {
        Err(UnsupportedOperationError {
            target: category.to_string(),
            kind: entity.kind_name().to_string(),
        })
    }
}

fn dropped(topic: &str, err: BridgeError) -> RouteOutcome {
    log_dropped(topic, &err);
    RouteOutcome::Dropped(err)
}

fn log_dropped(topic: &str, err: &BridgeError) {
    match err {
        BridgeError::Parse(inner) => tracing::warn!(%topic, error = %inner, "invalid command"),
        BridgeError::Unsupported(inner) => tracing::warn!(%topic, error = %inner, "unsupported command"),
        BridgeError::NotFound(inner) => tracing::warn!(%topic, error = %inner, "unknown command target"),
        BridgeError::Rejected(inner) => tracing::error!(%topic, error = %inner, "command rejected"),
        BridgeError::Transport(inner) => {
            tracing::error!(%topic, error = %inner, "command could not be delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FakeSession, SessionCall, gate_drive, heating_group, home, smoke_detector, thermostat,
    };

    fn router(session: &Arc<FakeSession>) -> CommandRouter<FakeSession> {
        CommandRouter::new(Arc::clone(session))
    }

    fn session() -> Arc<FakeSession> {
        Arc::new(FakeSession::new(
            vec![heating_group("g1")],
            vec![gate_drive("gd"), thermostat("t1"), smoke_detector("s1")],
            Some(home(false, false)),
        ))
    }

    #[tokio::test]
    async fn should_set_group_set_point() {
        let session = session();
        let outcome = router(&session)
            .route("cmd/homematicip/groups/heating/g1/set", "21.5")
            .await;

        assert!(matches!(outcome, RouteOutcome::Dispatched));
        assert_eq!(
            session.calls(),
            vec![SessionCall::SetPoint("g1".to_string(), 21.5)]
        );
    }

    #[tokio::test]
    async fn should_drop_non_numeric_set_point() {
        let session = session();
        let outcome = router(&session)
            .route("cmd/homematicip/groups/heating/g1/set", "abc")
            .await;

        assert!(matches!(
            outcome,
            RouteOutcome::Dropped(BridgeError::Parse(ParseError::InvalidSetPoint { .. }))
        ));
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn should_drop_command_for_unknown_group() {
        let session = session();
        let outcome = router(&session)
            .route("cmd/homematicip/groups/heating/nope/set", "21")
            .await;

        assert!(matches!(outcome, RouteOutcome::Dropped(BridgeError::NotFound(_))));
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn should_map_each_gate_literal() {
        for (literal, expected) in [
            ("OPEN", DoorCommand::Open),
            ("CLOSE", DoorCommand::Close),
            ("STOP", DoorCommand::Stop),
            ("PARTIAL_OPEN", DoorCommand::PartialOpen),
        ] {
            let session = session();
            router(&session)
                .route("cmd/homematicip/devices/hoermann_drive/gd/state", literal)
                .await;
            assert_eq!(
                session.calls(),
                vec![SessionCall::Door("gd".to_string(), expected)]
            );
        }
    }

    #[tokio::test]
    async fn should_reject_lowercase_gate_literal() {
        let session = session();
        let outcome = router(&session)
            .route("cmd/homematicip/devices/hoermann_drive/gd/state", "open")
            .await;

        assert!(matches!(
            outcome,
            RouteOutcome::Dropped(BridgeError::Parse(ParseError::InvalidDoorCommand { .. }))
        ));
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_writes_on_non_gate_devices() {
        let session = session();
        let outcome = router(&session)
            .route("cmd/homematicip/devices/hoermann_drive/s1/state", "OPEN")
            .await;

        let RouteOutcome::Dropped(BridgeError::Unsupported(err)) = outcome else {
            panic!("expected unsupported operation, got {outcome:?}");
        };
        assert_eq!(err.to_string(), "no updates allowed on devices of type SMOKE_DETECTOR");
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn should_map_alarm_modes_to_zones() {
        for (payload, expected) in [
            ("ABSENCE_MODE", SessionCall::Zones(true, true)),
            ("PRESENCE_MODE", SessionCall::Zones(false, true)),
            ("OFF", SessionCall::Zones(false, false)),
            ("whatever", SessionCall::Zones(false, false)),
        ] {
            let session = session();
            router(&session)
                .route("cmd/homematicip/home/alarm/home/state", payload)
                .await;
            assert_eq!(session.calls(), vec![expected], "payload {payload}");
        }
    }

    #[tokio::test]
    async fn should_drop_alarm_command_without_home_object() {
        let session = Arc::new(FakeSession::new(vec![heating_group("g1")], vec![], None));
        let outcome = router(&session)
            .route("cmd/homematicip/home/alarm/home/state", "OFF")
            .await;

        assert!(matches!(outcome, RouteOutcome::Dropped(BridgeError::NotFound(_))));
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_unknown_category() {
        let session = session();
        let outcome = router(&session)
            .route("cmd/homematicip/clients/app/x/set", "1")
            .await;

        assert!(matches!(outcome, RouteOutcome::Ignored));
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn should_drop_short_topic() {
        let session = session();
        let outcome = router(&session).route("cmd/homematicip/groups", "21").await;
        assert!(matches!(
            outcome,
            RouteOutcome::Dropped(BridgeError::Parse(ParseError::MalformedTopic { .. }))
        ));
    }

    #[tokio::test]
    async fn should_report_platform_rejection() {
        let session = Arc::new(
            FakeSession::new(vec![heating_group("g1")], vec![], None).rejecting("out of range"),
        );
        let outcome = router(&session)
            .route("cmd/homematicip/groups/heating/g1/set", "99")
            .await;

        assert!(matches!(outcome, RouteOutcome::Dropped(BridgeError::Rejected(_))));
        assert_eq!(session.calls().len(), 1);
    }

    #[tokio::test]
    async fn should_keep_routing_after_bad_messages() {
        let session = session();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(router(&session).run(rx));

        tx.send(InboundMessage {
            topic: "cmd/homematicip/groups/heating/g1/set".to_string(),
            payload: vec![0xff, 0xfe],
        })
        .await
        .unwrap();
        tx.send(InboundMessage {
            topic: "cmd/homematicip/groups/heating/g1/set".to_string(),
            payload: b"abc".to_vec(),
        })
        .await
        .unwrap();
        tx.send(InboundMessage {
            topic: "cmd/homematicip/groups/heating/g1/set".to_string(),
            payload: b"19".to_vec(),
        })
        .await
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(
            session.calls(),
            vec![SessionCall::SetPoint("g1".to_string(), 19.0)]
        );
    }
}
