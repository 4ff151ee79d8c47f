//! # hmip-bridge-adapter-virtual
//!
//! Virtual automation session serving a simulated home, for demos and
//! end-to-end tests without cloud credentials.
//!
//! ## Behaviour
//!
//! | Command | Effect | Event |
//! |---------|--------|-------|
//! | `set_group_set_point` | updates the heating group | `GROUP_CHANGED` |
//! | `send_door_command` | moves the gate drive | `DEVICE_CHANGED` |
//! | `set_security_zones` | arms/disarms the zones | `HOME_CHANGED` |
//!
//! `inject_transport_error` simulates a socket failure.
//!
//! ## Dependency rule
//!
//! Depends on `hmip-bridge-app` (port traits) and `hmip-bridge-domain` only.

mod error;
mod fixture;
mod session;

pub use error::VirtualSessionError;
pub use fixture::HomeFixture;
pub use session::VirtualSession;
