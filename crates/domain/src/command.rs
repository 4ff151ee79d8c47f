//! Inbound command grammar.
//!
//! Commands arrive on `cmd/homematicip/<category>/<subtype>/<id>/<verb>`
//! where the verb (`set`, `state`) is fixed by the subscription pattern and
//! ignored here. Parsing the payload is left to the typed parsers below so
//! the router can decide per target kind.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Root segment of command topics.
pub const COMMAND_ROOT: &str = "cmd/homematicip";

/// Subscription patterns for every writable target.
pub const COMMAND_PATTERNS: [&str; 3] = [
    "cmd/homematicip/groups/heating/+/set",
    "cmd/homematicip/devices/hoermann_drive/+/state",
    "cmd/homematicip/home/alarm/+/state",
];

/// Category segment of a command topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandCategory {
    Groups,
    Devices,
    Home,
    Other(String),
}

impl CommandCategory {
    fn parse(segment: &str) -> Self {
        match segment {
            "groups" => Self::Groups,
            "devices" => Self::Devices,
            "home" => Self::Home,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Groups => "groups",
            Self::Devices => "devices",
            Self::Home => "home",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed command; the value is still the raw payload text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub category: CommandCategory,
    pub subtype: String,
    pub id: String,
    pub value: String,
}

impl Command {
    /// Split a command topic and attach the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedTopic`] when the topic has fewer than
    /// five segments, or [`ParseError::UnexpectedPrefix`] when it is not
    /// rooted at `cmd/homematicip`.
    pub fn parse(topic: &str, payload: &str) -> Result<Self, ParseError> {
        let segments: Vec<&str> = topic.split('/').collect();
        if segments.len() < 5 {
            return Err(ParseError::MalformedTopic {
                topic: topic.to_string(),
                segments: segments.len(),
            });
        }
        let root = COMMAND_ROOT.split('/');
        if !segments.iter().copied().take(2).eq(root) {
            return Err(ParseError::UnexpectedPrefix {
                topic: topic.to_string(),
            });
        }
        Ok(Self {
            category: CommandCategory::parse(segments[2]),
            subtype: segments[3].to_string(),
            id: segments[4].to_string(),
            value: payload.to_string(),
        })
    }
}

/// Parse a heating set point in °C.
///
/// # Errors
///
/// Returns [`ParseError::InvalidSetPoint`] for non-numeric or non-finite
/// payloads.
pub fn parse_set_point(payload: &str) -> Result<f64, ParseError> {
    payload
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::InvalidSetPoint {
            payload: payload.to_string(),
        })
}

/// Command accepted by a gate drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorCommand {
    Open,
    Close,
    Stop,
    PartialOpen,
}

impl DoorCommand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::Stop => "STOP",
            Self::PartialOpen => "PARTIAL_OPEN",
        }
    }
}

impl fmt::Display for DoorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoorCommand {
    type Err = ParseError;

    /// Case-sensitive: only the upper-case literals are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "CLOSE" => Ok(Self::Close),
            "STOP" => Ok(Self::Stop),
            "PARTIAL_OPEN" => Ok(Self::PartialOpen),
            other => Err(ParseError::InvalidDoorCommand {
                payload: other.to_string(),
            }),
        }
    }
}
