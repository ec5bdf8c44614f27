use std::sync::Arc;

use thiserror::Error;

use crate::ErrorObject;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Session state required by the call is missing. Nothing was sent.
    #[error("precondition not met: {0}")]
    PreconditionNotMet(String),

    /// The call's arguments violate its contract. Nothing was sent.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The server answered with an `error` member.
    #[error("remote fault: {0}")]
    RemoteFault(ErrorObject),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("serialization failed: {0}")]
    Serialize(#[source] Arc<serde_json::Error>),

    #[error("transport failed: {0}")]
    Transport(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// The blocking client could not start its runtime.
    #[error("runtime failed to start: {0}")]
    Runtime(#[source] Arc<std::io::Error>),
}

impl Error {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionNotMet(message.into())
    }
    pub(crate) fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(%message, "protocol violation");
        Self::ProtocolViolation(message)
    }

    /// Wraps an error produced by a [`Transport`](crate::Transport) implementation.
    pub fn transport(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(e))
    }

    pub(crate) fn runtime(e: std::io::Error) -> Self {
        Self::Runtime(Arc::new(e))
    }

    pub fn error_object(&self) -> Option<&ErrorObject> {
        match self {
            Self::RemoteFault(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(Arc::new(e))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
