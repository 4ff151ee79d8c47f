//! # hmip-bridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `AutomationSession` — entity snapshots, change-event stream, commands
//!   - `MessageBus` — publish, subscribe, link state
//! - Define the use-cases driving those ports:
//!   - `OutboundPublisher` — entity snapshot → one retained publish per attribute
//!   - `CommandRouter` — inbound command topic → one session call
//!   - `SessionSupervisor` — sync, live mirroring, and reconnect policy
//!
//! ## Dependency rule
//! Depends on `hmip-bridge-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;
