//! Message bus port — topic-based publish/subscribe.

use std::future::Future;
use std::sync::Arc;

use hmip_bridge_domain::error::BridgeError;

/// Delivery guarantee requested for a publish or subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qos {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Link-state notices emitted by the bus after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusStatus {
    /// The broker connection dropped.
    Lost(String),
    /// The broker connection came back after a drop. Subscriptions and
    /// retained state must be re-established.
    Restored,
}

/// Publish/subscribe client.
pub trait MessageBus: Send + Sync {
    /// Publish one message.
    fn publish(
        &self,
        topic: &str,
        payload: String,
        retain: bool,
        qos: Qos,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Subscribe to a topic pattern (`+`/`#` wildcards allowed).
    fn subscribe(
        &self,
        pattern: &str,
        qos: Qos,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Whether the broker connection is currently up.
    fn is_connected(&self) -> bool;
}

impl<T: MessageBus> MessageBus for Arc<T> {
    fn publish(
        &self,
        topic: &str,
        payload: String,
        retain: bool,
        qos: Qos,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish(topic, payload, retain, qos)
    }

    fn subscribe(
        &self,
        pattern: &str,
        qos: Qos,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).subscribe(pattern, qos)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
