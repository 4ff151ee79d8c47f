//! Group snapshots.

use serde::{Deserialize, Serialize};

use crate::entity::state::{ClimateControlMode, WindowState};
use crate::id::GroupId;

/// A room-level heating group aggregating thermostats and contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatingGroup {
    pub id: GroupId,
    pub label: String,
    pub set_point_temperature: f64,
    #[serde(default)]
    pub actual_temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub valve_position: Option<f64>,
    #[serde(default)]
    pub window_state: Option<WindowState>,
    #[serde(default)]
    pub control_mode: Option<ClimateControlMode>,
}
