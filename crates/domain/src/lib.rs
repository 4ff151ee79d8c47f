//! # hmip-bridge-domain
//!
//! Pure domain model for the Homematic IP ↔ MQTT bridge.
//!
//! ## Responsibilities
//! - Typed, platform-assigned identifiers and the error taxonomy
//! - Define **Entities** (devices, groups, home security state) as a closed union
//! - Define **Change events** delivered by the automation session
//! - Define the **Command grammar** for inbound command topics
//! - Define the **Topic mapper**: entity snapshot → topics and values
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod command;
pub mod entity;
pub mod event;
pub mod topic;
