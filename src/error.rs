use thiserror::Error;

use crate::model::Capability;

/// A response that could not become a `CapabilityResult`.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed json: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("expected a json object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("missing capability discriminant")]
    MissingDiscriminant,

    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    #[error("invalid {capability} payload: {message}")]
    InvalidPayload {
        capability: Capability,
        message: String,
    },
}

/// Failure of one capability invocation, attached to the request that caused it.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("analysis service unreachable: {message}")]
    Transport { message: String },

    #[error("analysis service returned {status}: {detail}")]
    Service { status: u16, detail: String },

    #[error("analysis response rejected: {0}")]
    Validation(#[from] ModelError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No connection.
    Transport,
    /// Reachable, but the service reported an error.
    Service,
    /// Reachable, but the data was bad.
    Validation,
}

impl RequestError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RequestError::Transport { .. } => FailureKind::Transport,
            RequestError::Service { .. } => FailureKind::Service,
            RequestError::Validation(_) => FailureKind::Validation,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        RequestError::Transport {
            message: err.to_string(),
        }
    }
}
