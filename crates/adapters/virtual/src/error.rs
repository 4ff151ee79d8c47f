//! Virtual session error types.

use hmip_bridge_domain::error::{BridgeError, NotFoundError, PlatformRejection, TransportError};

/// Errors raised while loading or driving the virtual home.
#[derive(Debug, thiserror::Error)]
pub enum VirtualSessionError {
    #[error("failed to read fixture")]
    Io(#[from] std::io::Error),

    #[error("failed to parse fixture")]
    Parse(#[from] toml::de::Error),

    /// The fixture places an entity in the wrong list.
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("group {0} not found")]
    UnknownGroup(String),

    #[error("device {0} not found")]
    UnknownDevice(String),

    /// The addressed entity does not accept this command.
    #[error("{id} of type {kind} does not accept this command")]
    NotWritable { id: String, kind: String },

    #[error("no home configured")]
    NoHome,
}

impl VirtualSessionError {
    /// Convert into the error the platform would answer with.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::UnknownGroup(id) => NotFoundError { entity: "group", id }.into(),
            Self::UnknownDevice(id) => NotFoundError {
                entity: "device",
                id,
            }
            .into(),
            Self::NotWritable { .. } | Self::NoHome => PlatformRejection::new(self.to_string()).into(),
            other => TransportError::with_source("virtual session", other).into(),
        }
    }
}

impl From<VirtualSessionError> for BridgeError {
    fn from(err: VirtualSessionError) -> Self {
        err.into_domain()
    }
}
