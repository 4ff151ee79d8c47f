//! # hmip-bridge-adapter-mqtt
//!
//! MQTT adapter — implements the `MessageBus` port with rumqttc.
//!
//! ## Responsibilities
//! - Connect to the broker with optional credentials
//! - Publish retained state and subscribe to command patterns
//! - Forward incoming publishes to the command router's channel
//! - Report connection drops and recoveries so the supervisor can resync
//!
//! ## Dependency rule
//! Same as other adapters: depends on `hmip-bridge-app` and
//! `hmip-bridge-domain`.

mod client;
mod config;
mod error;

pub use client::{MqttBus, MqttConnection, connect};
pub use config::MqttConfig;
pub use error::MqttError;
