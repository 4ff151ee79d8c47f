//! Device snapshots, one struct per mirrored device kind.
//!
//! Field names follow the platform's JSON (`lowBat`, `setPointTemperature`,
//! …) so snapshots deserialize straight from platform payloads and fixtures.

use serde::{Deserialize, Serialize};

use crate::entity::state::{DoorState, WindValueType, WindowSensorModel, WindowState};
use crate::id::DeviceId;

/// Radiator thermostat, including the compact model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatingThermostat {
    pub id: DeviceId,
    #[serde(rename = "lowBat", default)]
    pub low_battery: Option<bool>,
    pub set_point_temperature: f64,
    #[serde(default)]
    pub valve_actual_temperature: Option<f64>,
    #[serde(default)]
    pub valve_position: Option<f64>,
}

/// Anything reporting a window state: shutter contacts, contact interfaces,
/// rotary handle sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSensor {
    pub id: DeviceId,
    #[serde(default)]
    pub model: Option<WindowSensorModel>,
    #[serde(rename = "lowBat", default)]
    pub low_battery: Option<bool>,
    #[serde(default)]
    pub window_state: Option<WindowState>,
}

/// Wall mounted thermostat with display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallThermostat {
    pub id: DeviceId,
    #[serde(rename = "lowBat", default)]
    pub low_battery: Option<bool>,
    pub set_point_temperature: f64,
    #[serde(default)]
    pub actual_temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureHumiditySensor {
    pub id: DeviceId,
    #[serde(rename = "lowBat", default)]
    pub low_battery: Option<bool>,
    #[serde(default)]
    pub actual_temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub vapor_amount: Option<f64>,
}

/// Outdoor weather station. Sunshine durations are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSensor {
    pub id: DeviceId,
    #[serde(rename = "lowBat", default)]
    pub low_battery: Option<bool>,
    #[serde(default)]
    pub actual_temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub illumination: Option<f64>,
    #[serde(default)]
    pub illumination_threshold_sunshine: Option<f64>,
    #[serde(default)]
    pub storm: Option<bool>,
    #[serde(default)]
    pub sunshine: Option<bool>,
    #[serde(default)]
    pub today_sunshine_duration: Option<u32>,
    #[serde(default)]
    pub total_sunshine_duration: Option<u32>,
    #[serde(default)]
    pub wind_value_type: Option<WindValueType>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub yesterday_sunshine_duration: Option<u32>,
    #[serde(default)]
    pub vapor_amount: Option<f64>,
}

/// Hörmann gate/garage drive module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDrive {
    pub id: DeviceId,
    #[serde(default)]
    pub door_state: Option<DoorState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionDetector {
    pub id: DeviceId,
    #[serde(rename = "lowBat", default)]
    pub low_battery: Option<bool>,
    #[serde(default)]
    pub current_illumination: Option<f64>,
    #[serde(default)]
    pub illumination: Option<f64>,
    #[serde(default)]
    pub motion_detected: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokeDetector {
    pub id: DeviceId,
    #[serde(rename = "lowBat", default)]
    pub low_battery: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSiren {
    pub id: DeviceId,
    #[serde(rename = "lowBat", default)]
    pub low_battery: Option<bool>,
}

/// Brightness sensor reporting illumination statistics in lux.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSensor {
    pub id: DeviceId,
    #[serde(default)]
    pub average_illumination: Option<f64>,
    #[serde(default)]
    pub current_illumination: Option<f64>,
    #[serde(default)]
    pub highest_illumination: Option<f64>,
    #[serde(default)]
    pub lowest_illumination: Option<f64>,
}
