//! Outbound publisher — mirrors entity snapshots onto the bus.

use std::ops::AddAssign;

use hmip_bridge_domain::entity::Entity;
use hmip_bridge_domain::topic;

use crate::ports::{MessageBus, Qos};

/// Outcome of publishing one or more entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Attributes handed to the bus.
    pub published: usize,
    /// Attributes the bus refused.
    pub failed: usize,
    /// Attributes not sent because of dry run or a missing connection.
    pub skipped: usize,
}

impl AddAssign for PublishReport {
    fn add_assign(&mut self, rhs: Self) {
        self.published += rhs.published;
        self.failed += rhs.failed;
        self.skipped += rhs.skipped;
    }
}

/// Publishes every mapped attribute of an entity as a retained message.
///
/// The bus is attached explicitly once it exists; until then publishing is a
/// logged no-op. Events can reach the publisher before the broker connection
/// is up.
pub struct OutboundPublisher<B> {
    bus: Option<B>,
    dry_run: bool,
}

impl<B: MessageBus> OutboundPublisher<B> {
    /// Create a publisher with no bus attached.
    ///
    /// With `dry_run` set, each publish is replaced by an `info` log line.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self { bus: None, dry_run }
    }

    /// Attach the bus client used for publishing.
    pub fn attach(&mut self, bus: B) {
        self.bus = Some(bus);
    }

    /// Publish one retained, at-most-once message per attribute of `entity`.
    ///
    /// A failed attribute is logged and counted; the remaining attributes
    /// are still published.
    pub async fn publish_entity(&self, entity: &Entity) -> PublishReport {
        let mut report = PublishReport::default();

        let Some(mapping) = topic::map(entity) else {
            tracing::debug!(
                id = entity.id(),
                kind = entity.kind_name(),
                "unhandled entity type"
            );
            return report;
        };

        let bus = match &self.bus {
            Some(bus) if self.dry_run || bus.is_connected() => Some(bus),
            Some(_) => {
                tracing::debug!(prefix = %mapping.prefix, "bus not connected, skipping publish");
                report.skipped = mapping.attributes.len();
                return report;
            }
            None if self.dry_run => None,
            None => {
                tracing::debug!(prefix = %mapping.prefix, "no bus client available, skipping publish");
                report.skipped = mapping.attributes.len();
                return report;
            }
        };

        for (topic, value) in mapping.topics() {
            let payload = value.to_payload();
            let Some(bus) = bus.filter(|_| !self.dry_run) else {
                tracing::info!(%topic, %payload, "would publish");
                report.skipped += 1;
                continue;
            };
            match bus.publish(&topic, payload, true, Qos::AtMostOnce).await {
                Ok(()) => {
                    tracing::debug!(%topic, "published");
                    report.published += 1;
                }
                Err(err) => {
                    tracing::error!(%topic, error = %err, "failed to publish");
                    report.failed += 1;
                }
            }
        }

        report
    }
}
