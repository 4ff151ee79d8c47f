//! rumqttc-backed bus client and its connection driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, Packet, QoS};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use hmip_bridge_app::ports::{BusStatus, InboundMessage, MessageBus, Qos};
use hmip_bridge_domain::error::BridgeError;

use crate::config::MqttConfig;
use crate::error::MqttError;

const REQUEST_CAPACITY: usize = 64;
const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Create a client and the connection that drives it.
///
/// Nothing touches the network until [`MqttConnection::wait_connected`] or
/// [`MqttConnection::run`] polls the event loop.
#[must_use]
pub fn connect(config: &MqttConfig) -> (MqttBus, MqttConnection) {
    let (client, event_loop) = AsyncClient::new(config.options(), REQUEST_CAPACITY);
    let connected = Arc::new(AtomicBool::new(false));
    let bus = MqttBus {
        client,
        connected: Arc::clone(&connected),
    };
    let connection = MqttConnection {
        event_loop,
        connected,
        host: config.host.clone(),
        port: config.port,
    };
    (bus, connection)
}

fn qos(value: Qos) -> QoS {
    match value {
        Qos::AtMostOnce => QoS::AtMostOnce,
        Qos::AtLeastOnce => QoS::AtLeastOnce,
        Qos::ExactlyOnce => QoS::ExactlyOnce,
    }
}

/// Handle used to publish and subscribe. Cheap to clone.
#[derive(Clone)]
pub struct MqttBus {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
}

impl MqttBus {
    /// Send a DISCONNECT to the broker. [`MqttConnection::run`] returns once
    /// it has been written.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Client`] if the request queue is closed.
    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.client.disconnect().await.map_err(MqttError::Client)
    }
}

impl MessageBus for MqttBus {
    async fn publish(
        &self,
        topic: &str,
        payload: String,
        retain: bool,
        qos_level: Qos,
    ) -> Result<(), BridgeError> {
        if !self.is_connected() {
            return Err(MqttError::NotConnected.into());
        }
        self.client
            .publish(topic, qos(qos_level), retain, payload)
            .await
            .map_err(|err| MqttError::Client(err).into())
    }

    async fn subscribe(&self, pattern: &str, qos_level: Qos) -> Result<(), BridgeError> {
        if !self.is_connected() {
            return Err(MqttError::NotConnected.into());
        }
        self.client
            .subscribe(pattern, qos(qos_level))
            .await
            .map_err(|err| MqttError::Client(err).into())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Owns the rumqttc event loop.
pub struct MqttConnection {
    event_loop: EventLoop,
    connected: Arc<AtomicBool>,
    host: String,
    port: u16,
}

impl MqttConnection {
    /// Poll until the broker acknowledges the connection.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Connection`] on the first connection failure.
    pub async fn wait_connected(&mut self) -> Result<(), MqttError> {
        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    self.connected.store(true, Ordering::SeqCst);
                    tracing::info!(host = %self.host, port = self.port, "connected to MQTT broker");
                    return Ok(());
                }
                Ok(_) => {}
                Err(err) => return Err(MqttError::Connection(err)),
            }
        }
    }

    /// Drive the event loop until a DISCONNECT has been sent.
    ///
    /// Incoming publishes go to `inbound`. Connection drops and recoveries
    /// are reported on `status`; rumqttc reconnects on the next poll.
    /// Neither channel is awaited: a full queue drops the item with a warning
    /// so the event loop keeps serving publishes.
    pub async fn run(
        mut self,
        inbound: mpsc::Sender<InboundMessage>,
        status: mpsc::Sender<BusStatus>,
    ) {
        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    tracing::trace!(topic = %publish.topic, "message received");
                    let message = InboundMessage {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    };
                    forward(&inbound, message);
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    if !self.connected.swap(true, Ordering::SeqCst) {
                        tracing::info!(host = %self.host, port = self.port, "reconnected to MQTT broker");
                        notify(&status, BusStatus::Restored);
                    }
                }
                Ok(event) if is_disconnect(&event) => {
                    self.connected.store(false, Ordering::SeqCst);
                    tracing::info!(
                        host = %self.host,
                        port = self.port,
                        "disconnected from MQTT broker"
                    );
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    let was_connected = self.connected.swap(false, Ordering::SeqCst);
                    tracing::error!(error = %err, "MQTT connection error");
                    if was_connected {
                        notify(&status, BusStatus::Lost(err.to_string()));
                    }
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
            }
        }
    }
}

fn is_disconnect(event: &Event) -> bool {
    matches!(event, Event::Outgoing(Outgoing::Disconnect))
}

fn forward(inbound: &mpsc::Sender<InboundMessage>, message: InboundMessage) {
    match inbound.try_send(message) {
        Ok(()) => {}
        Err(TrySendError::Full(message)) => {
            tracing::warn!(topic = %message.topic, "inbound queue full, dropping message");
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!("inbound channel closed, dropping message");
        }
    }
}

fn notify(status: &mpsc::Sender<BusStatus>, notice: BusStatus) {
    match status.try_send(notice) {
        Ok(()) => {}
        Err(TrySendError::Full(notice)) => {
            tracing::warn!(?notice, "link status queue full, dropping notice");
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!("link status channel closed");
        }
    }
}
