//! Error taxonomy shared across the workspace.
//!
//! Each handling unit (publisher, router, supervisor) catches these at its own
//! boundary and logs them; none of them stop the process. Fatal startup
//! failures (configuration, broker connect) live in the binary crate.

/// Base error type for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Bus or session connection failure. Recoverable through a resync.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Malformed command topic or payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The target exists but does not accept this kind of write.
    #[error("{0}")]
    Unsupported(#[from] UnsupportedOperationError),

    /// The command addressed an entity the session does not know.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// The automation platform refused the command.
    #[error("{0}")]
    Rejected(#[from] PlatformRejection),
}

/// A connection to the bus or the automation session failed.
#[derive(Debug, thiserror::Error)]
#[error("{context}")]
pub struct TransportError {
    pub context: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Transport error without an underlying cause.
    #[must_use]
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: None,
        }
    }

    /// Transport error wrapping the error reported by the underlying client.
    #[must_use]
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Why an inbound command could not be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("command topic {topic:?} has {segments} segments, expected at least 5")]
    MalformedTopic { topic: String, segments: usize },

    #[error("command topic {topic:?} does not start with cmd/homematicip")]
    UnexpectedPrefix { topic: String },

    #[error("invalid set point {payload:?}")]
    InvalidSetPoint { payload: String },

    #[error("invalid door command {payload:?}, expected OPEN, CLOSE, STOP or PARTIAL_OPEN")]
    InvalidDoorCommand { payload: String },

    #[error("payload is not valid UTF-8")]
    InvalidEncoding,
}

/// A valid command aimed at something that cannot be written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no updates allowed on {target} of type {kind}")]
pub struct UnsupportedOperationError {
    /// Target category (`groups`, `devices`, `home`).
    pub target: String,
    /// Kind of the addressed entity, or the unknown subtype.
    pub kind: String,
}

/// Lookup of an entity by id failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The platform answered a command with a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("platform rejected the command: {reason}")]
pub struct PlatformRejection {
    pub reason: String,
}

impl PlatformRejection {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
