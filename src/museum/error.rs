//! Acquisition errors.

use crate::proxy::ProxyError;

/// Coarse error category, for callers that only need to branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkFailure,
    EmptyResultSet,
    MalformedPayload,
    MaxAttemptsReached,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkFailure => "network_failure",
            Self::EmptyResultSet => "empty_result_set",
            Self::MalformedPayload => "malformed_payload",
            Self::MaxAttemptsReached => "max_attempts_reached",
        }
    }
}

/// Errors raised while acquiring an object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("No usable results for '{term}'")]
    EmptyResultSet { term: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Gave up after {attempts} attempt(s)")]
    MaxAttemptsReached { attempts: u32 },
}

impl AcquisitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkFailure(_) => ErrorKind::NetworkFailure,
            Self::EmptyResultSet { .. } => ErrorKind::EmptyResultSet,
            Self::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Self::MaxAttemptsReached { .. } => ErrorKind::MaxAttemptsReached,
        }
    }

    /// Whether a new term should be tried. Only budget exhaustion is terminal.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MaxAttemptsReached { .. })
    }
}

impl From<ProxyError> for AcquisitionError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Decode(msg) => Self::MalformedPayload(msg),
            other => Self::NetworkFailure(other.to_string()),
        }
    }
}
