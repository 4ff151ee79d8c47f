//! Entity — a device, group, or the home object tracked by the automation
//! session.
//!
//! [`Entity`] is a closed union: adding a kind forces a decision in the topic
//! mapper and in the command router, both of which match exhaustively.

mod attribute_value;
pub mod device;
pub mod group;
pub mod home;
pub mod state;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use attribute_value::AttributeValue;
pub use device::{
    AlarmSiren, GateDrive, HeatingThermostat, LightSensor, MotionDetector, SmokeDetector,
    TemperatureHumiditySensor, WallThermostat, WeatherSensor, WindowSensor,
};
pub use group::HeatingGroup;
pub use home::{AlarmMode, HomeSecurityState};

/// Snapshot of an entity owned by the automation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    HeatingGroup(HeatingGroup),
    HeatingThermostat(HeatingThermostat),
    WindowSensor(WindowSensor),
    WallThermostat(WallThermostat),
    TemperatureHumiditySensor(TemperatureHumiditySensor),
    WeatherSensor(WeatherSensor),
    GateDrive(GateDrive),
    MotionDetector(MotionDetector),
    SmokeDetector(SmokeDetector),
    AlarmSiren(AlarmSiren),
    LightSensor(LightSensor),
    HomeSecurityState(HomeSecurityState),
    /// A kind the platform reports that the bridge does not mirror.
    Unsupported(UnsupportedEntity),
}

/// Placeholder for entity kinds without a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsupportedEntity {
    pub id: String,
    pub category: EntityCategory,
    /// Platform type name, e.g. `PLUGABLE_SWITCH`.
    pub type_name: String,
}

/// Namespace an identifier is unique within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Groups,
    Devices,
    Home,
}

impl EntityCategory {
    /// Path segment used in topics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groups => "groups",
            Self::Devices => "devices",
            Self::Home => "home",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Entity {
    /// The platform-assigned identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::HeatingGroup(e) => e.id.as_str(),
            Self::HeatingThermostat(e) => e.id.as_str(),
            Self::WindowSensor(e) => e.id.as_str(),
            Self::WallThermostat(e) => e.id.as_str(),
            Self::TemperatureHumiditySensor(e) => e.id.as_str(),
            Self::WeatherSensor(e) => e.id.as_str(),
            Self::GateDrive(e) => e.id.as_str(),
            Self::MotionDetector(e) => e.id.as_str(),
            Self::SmokeDetector(e) => e.id.as_str(),
            Self::AlarmSiren(e) => e.id.as_str(),
            Self::LightSensor(e) => e.id.as_str(),
            Self::HomeSecurityState(e) => e.id.as_str(),
            Self::Unsupported(e) => &e.id,
        }
    }

    #[must_use]
    pub fn category(&self) -> EntityCategory {
        match self {
            Self::HeatingGroup(_) => EntityCategory::Groups,
            Self::HeatingThermostat(_)
            | Self::WindowSensor(_)
            | Self::WallThermostat(_)
            | Self::TemperatureHumiditySensor(_)
            | Self::WeatherSensor(_)
            | Self::GateDrive(_)
            | Self::MotionDetector(_)
            | Self::SmokeDetector(_)
            | Self::AlarmSiren(_)
            | Self::LightSensor(_) => EntityCategory::Devices,
            Self::HomeSecurityState(_) => EntityCategory::Home,
            Self::Unsupported(e) => e.category,
        }
    }

    /// Kind name for log lines, matching the serialized `type` tag.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Self::HeatingGroup(_) => "HEATING_GROUP",
            Self::HeatingThermostat(_) => "HEATING_THERMOSTAT",
            Self::WindowSensor(_) => "WINDOW_SENSOR",
            Self::WallThermostat(_) => "WALL_THERMOSTAT",
            Self::TemperatureHumiditySensor(_) => "TEMPERATURE_HUMIDITY_SENSOR",
            Self::WeatherSensor(_) => "WEATHER_SENSOR",
            Self::GateDrive(_) => "GATE_DRIVE",
            Self::MotionDetector(_) => "MOTION_DETECTOR",
            Self::SmokeDetector(_) => "SMOKE_DETECTOR",
            Self::AlarmSiren(_) => "ALARM_SIREN",
            Self::LightSensor(_) => "LIGHT_SENSOR",
            Self::HomeSecurityState(_) => "HOME_SECURITY_STATE",
            Self::Unsupported(e) => &e.type_name,
        }
    }

    /// The command this entity accepts, if any.
    #[must_use]
    pub fn writable(&self) -> Option<Writable> {
        match self {
            Self::HeatingGroup(_) => Some(Writable::HeatingSetPoint),
            Self::GateDrive(_) => Some(Writable::DoorCommand),
            Self::HomeSecurityState(_) => Some(Writable::SecurityZones),
            Self::HeatingThermostat(_)
            | Self::WindowSensor(_)
            | Self::WallThermostat(_)
            | Self::TemperatureHumiditySensor(_)
            | Self::WeatherSensor(_)
            | Self::MotionDetector(_)
            | Self::SmokeDetector(_)
            | Self::AlarmSiren(_)
            | Self::LightSensor(_)
            | Self::Unsupported(_) => None,
        }
    }
}

/// Kind of write an entity accepts from the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writable {
    /// Target temperature of a heating group.
    HeatingSetPoint,
    /// Open/close/stop of a gate drive.
    DoorCommand,
    /// Internal and external zones of the home alarm.
    SecurityZones,
}
