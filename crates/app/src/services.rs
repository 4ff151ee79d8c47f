//! Use-case services driving the ports.

pub mod command_router;
pub mod publisher;
