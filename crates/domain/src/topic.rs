//! Topic mapper — entity snapshot → topic prefix and ordered attributes.
//!
//! Pure and deterministic: the same snapshot always yields the same topics
//! and values, whether it comes from a full sync or from a change event.
//! Suffixes are part of the wire contract with retained bus state and must
//! not change between releases.
//!
//! | Kind | Prefix | Suffixes |
//! |------|--------|----------|
//! | Heating group | `groups/heating/{id}` | `label`, `set`, `temperature`, `humidity`, `valve`, `window`, `mode` |
//! | Heating thermostat | `devices/thermostat/{id}` | `low_battery`, `set`, `temperature`, `valve` |
//! | Window sensor | `devices/window/{id}` | `low_battery`, `state` |
//! | Wall thermostat | `devices/wall_thermostat/{id}` | `low_battery`, `set`, `temperature`, `humidity` |
//! | Temperature/humidity sensor | `devices/temperature_humidity_sensor/{id}` | `low_battery`, `temperature`, `humidity`, `vapor_amount` |
//! | Weather sensor | `devices/weather/{id}` | see [`map`] |
//! | Gate drive | `devices/hoermann_drive/{id}` | `state` |
//! | Motion detector | `devices/motion_detector/{id}` | `low_battery`, `current_illumination`, `illumination`, `motion_detected` |
//! | Smoke detector | `devices/smoke_detector/{id}` | `low_battery` |
//! | Alarm siren | `devices/alarm_siren/{id}` | `low_battery` |
//! | Light sensor | `devices/light_sensor/{id}` | `average`, `current`, `highest`, `lowest` |
//! | Home | `home/alarm/{id}` | `state` |

use crate::entity::{AttributeValue, Entity};

/// Root segment of every mirrored topic.
pub const TOPIC_ROOT: &str = "homematicip";

/// Topics and values for one entity snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMapping {
    /// `<category>/<subtype>/<id>`, without the root.
    pub prefix: String,
    /// Suffix/value pairs in publication order.
    pub attributes: Vec<(&'static str, AttributeValue)>,
}

impl TopicMapping {
    fn new(category: &str, subtype: &str, id: &str) -> Self {
        Self {
            prefix: format!("{category}/{subtype}/{id}"),
            attributes: Vec::new(),
        }
    }

    fn with(mut self, suffix: &'static str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push((suffix, value.into()));
        self
    }

    /// Full topic for an attribute suffix.
    #[must_use]
    pub fn topic(&self, suffix: &str) -> String {
        format!("{TOPIC_ROOT}/{}/{suffix}", self.prefix)
    }

    /// `(topic, value)` pairs in publication order.
    pub fn topics(&self) -> impl Iterator<Item = (String, &AttributeValue)> + '_ {
        self.attributes
            .iter()
            .map(|(suffix, value)| (self.topic(suffix), value))
    }
}

/// Map an entity snapshot to its topics.
///
/// Returns `None` for kinds without a mapping; callers log and skip them.
#[must_use]
pub fn map(entity: &Entity) -> Option<TopicMapping> {
    let mapping = match entity {
        Entity::HeatingGroup(g) => TopicMapping::new("groups", "heating", g.id.as_str())
            .with("label", g.label.as_str())
            .with("set", g.set_point_temperature)
            .with("temperature", g.actual_temperature)
            .with("humidity", g.humidity)
            .with("valve", g.valve_position)
            .with("window", g.window_state)
            .with("mode", g.control_mode),
        Entity::HeatingThermostat(d) => TopicMapping::new("devices", "thermostat", d.id.as_str())
            .with("low_battery", d.low_battery)
            .with("set", d.set_point_temperature)
            .with("temperature", d.valve_actual_temperature)
            .with("valve", d.valve_position),
        Entity::WindowSensor(d) => TopicMapping::new("devices", "window", d.id.as_str())
            .with("low_battery", d.low_battery)
            .with("state", d.window_state),
        Entity::WallThermostat(d) => {
            TopicMapping::new("devices", "wall_thermostat", d.id.as_str())
                .with("low_battery", d.low_battery)
                .with("set", d.set_point_temperature)
                .with("temperature", d.actual_temperature)
                .with("humidity", d.humidity)
        }
        Entity::TemperatureHumiditySensor(d) => {
            TopicMapping::new("devices", "temperature_humidity_sensor", d.id.as_str())
                .with("low_battery", d.low_battery)
                .with("temperature", d.actual_temperature)
                .with("humidity", d.humidity)
                .with("vapor_amount", d.vapor_amount)
        }
        Entity::WeatherSensor(d) => TopicMapping::new("devices", "weather", d.id.as_str())
            .with("low_battery", d.low_battery)
            .with("temperature", d.actual_temperature)
            .with("humidity", d.humidity)
            .with("illumination", d.illumination)
            .with(
                "illumination_threshold_sunshine",
                d.illumination_threshold_sunshine,
            )
            .with("storm", d.storm)
            .with("sunshine", d.sunshine)
            .with("today_sunshine_duration", d.today_sunshine_duration)
            .with("total_sunshine_duration", d.total_sunshine_duration)
            .with("wind_value_type", d.wind_value_type)
            .with("wind_speed", d.wind_speed)
            .with("yesterday_sunshine_duration", d.yesterday_sunshine_duration)
            .with("vapor_amount", d.vapor_amount),
        Entity::GateDrive(d) => TopicMapping::new("devices", "hoermann_drive", d.id.as_str())
            .with("state", d.door_state),
        Entity::MotionDetector(d) => {
            TopicMapping::new("devices", "motion_detector", d.id.as_str())
                .with("low_battery", d.low_battery)
                .with("current_illumination", d.current_illumination)
                .with("illumination", d.illumination)
                .with("motion_detected", d.motion_detected)
        }
        Entity::SmokeDetector(d) => TopicMapping::new("devices", "smoke_detector", d.id.as_str())
            .with("low_battery", d.low_battery),
        Entity::AlarmSiren(d) => TopicMapping::new("devices", "alarm_siren", d.id.as_str())
            .with("low_battery", d.low_battery),
        Entity::LightSensor(d) => TopicMapping::new("devices", "light_sensor", d.id.as_str())
            .with("average", d.average_illumination)
            .with("current", d.current_illumination)
            .with("highest", d.highest_illumination)
            .with("lowest", d.lowest_illumination),
        Entity::HomeSecurityState(h) => TopicMapping::new("home", "alarm", h.id.as_str())
            .with("state", h.alarm_mode().as_str()),
        Entity::Unsupported(_) => return None,
    };
    Some(mapping)
}
