//! Home-level security state and its alarm mode encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::HomeId;

/// Activation of the two security zones of the home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSecurityState {
    pub id: HomeId,
    pub internal_active: bool,
    pub external_active: bool,
}

impl HomeSecurityState {
    /// Alarm mode derived from the zone activation.
    #[must_use]
    pub fn alarm_mode(&self) -> AlarmMode {
        AlarmMode::from_zones(self.internal_active, self.external_active)
    }
}

/// Bus-facing encoding of the security zone pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmMode {
    /// Both zones armed.
    AbsenceMode,
    /// Only the external zone armed.
    PresenceMode,
    Off,
}

impl AlarmMode {
    /// `(true, true)` is absence, `(false, true)` presence, anything else off.
    #[must_use]
    pub fn from_zones(internal_active: bool, external_active: bool) -> Self {
        match (internal_active, external_active) {
            (true, true) => Self::AbsenceMode,
            (false, true) => Self::PresenceMode,
            _ => Self::Off,
        }
    }

    /// Decode a command payload. Unknown literals disarm both zones.
    #[must_use]
    pub fn from_payload(payload: &str) -> Self {
        match payload {
            "ABSENCE_MODE" => Self::AbsenceMode,
            "PRESENCE_MODE" => Self::PresenceMode,
            _ => Self::Off,
        }
    }

    /// The `(internal, external)` activation requested by this mode.
    #[must_use]
    pub fn zones(self) -> (bool, bool) {
        match self {
            Self::AbsenceMode => (true, true),
            Self::PresenceMode => (false, true),
            Self::Off => (false, false),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AbsenceMode => "ABSENCE_MODE",
            Self::PresenceMode => "PRESENCE_MODE",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for AlarmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
