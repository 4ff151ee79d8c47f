//! Change events emitted by the automation session.
//!
//! Events are transient: consumed once by the supervisor and never stored.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entity::Entity;
use crate::error::TransportError;

/// UTC timestamp used to stamp received change events.
pub type Timestamp = DateTime<Utc>;

/// Platform event type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    DeviceChanged,
    GroupChanged,
    HomeChanged,
    DeviceAdded,
    DeviceRemoved,
    GroupAdded,
    GroupRemoved,
    ClientAdded,
    ClientChanged,
    ClientRemoved,
    SecurityJournalChanged,
    Other(String),
}

impl ChangeKind {
    /// Whether events of this kind are mirrored to the bus.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        matches!(
            self,
            Self::DeviceChanged | Self::GroupChanged | Self::HomeChanged
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DeviceChanged => "DEVICE_CHANGED",
            Self::GroupChanged => "GROUP_CHANGED",
            Self::HomeChanged => "HOME_CHANGED",
            Self::DeviceAdded => "DEVICE_ADDED",
            Self::DeviceRemoved => "DEVICE_REMOVED",
            Self::GroupAdded => "GROUP_ADDED",
            Self::GroupRemoved => "GROUP_REMOVED",
            Self::ClientAdded => "CLIENT_ADDED",
            Self::ClientChanged => "CLIENT_CHANGED",
            Self::ClientRemoved => "CLIENT_REMOVED",
            Self::SecurityJournalChanged => "SECURITY_JOURNAL_CHANGED",
            Self::Other(name) => name,
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "DEVICE_CHANGED" => Self::DeviceChanged,
            "GROUP_CHANGED" => Self::GroupChanged,
            "HOME_CHANGED" => Self::HomeChanged,
            "DEVICE_ADDED" => Self::DeviceAdded,
            "DEVICE_REMOVED" => Self::DeviceRemoved,
            "GROUP_ADDED" => Self::GroupAdded,
            "GROUP_REMOVED" => Self::GroupRemoved,
            "CLIENT_ADDED" => Self::ClientAdded,
            "CLIENT_CHANGED" => Self::ClientChanged,
            "CLIENT_REMOVED" => Self::ClientRemoved,
            "SECURITY_JOURNAL_CHANGED" => Self::SecurityJournalChanged,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChangeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChangeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A single change reported by the session, carrying the new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub entity: Entity,
    pub received_at: Timestamp,
}

impl ChangeEvent {
    /// Stamp a change with the current time.
    #[must_use]
    pub fn new(kind: ChangeKind, entity: Entity) -> Self {
        Self {
            kind,
            entity,
            received_at: Utc::now(),
        }
    }

    /// `DEVICE_CHANGED`, `GROUP_CHANGED` or `HOME_CHANGED` depending on the
    /// entity's category.
    #[must_use]
    pub fn changed(entity: Entity) -> Self {
        let kind = match entity.category() {
            crate::entity::EntityCategory::Groups => ChangeKind::GroupChanged,
            crate::entity::EntityCategory::Devices => ChangeKind::DeviceChanged,
            crate::entity::EntityCategory::Home => ChangeKind::HomeChanged,
        };
        Self::new(kind, entity)
    }

    /// Time since the change was received. Zero if the clock went backwards.
    #[must_use]
    pub fn age(&self) -> std::time::Duration {
        (Utc::now() - self.received_at).to_std().unwrap_or_default()
    }
}

/// Item of the session's event stream.
#[derive(Debug)]
pub enum SessionEvent {
    Change(ChangeEvent),
    /// The event socket failed; the stream yields nothing further.
    Error(TransportError),
}
