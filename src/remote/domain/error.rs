//! Error types for remote-system access.

use thiserror::Error;

/// Result type for remote-system operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised while exchanging client credentials for a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The authorization endpoint could not be reached.
    #[error("authorization endpoint unreachable: {0}")]
    Transport(String),

    /// The authorization endpoint refused the credentials.
    #[error("token exchange rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status returned by the endpoint.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// The token response could not be interpreted.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

/// Errors raised by remote-system operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// No usable bearer token could be obtained.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request kept failing with a retryable condition.
    #[error("remote request failed after {attempts} attempt(s): {message}")]
    Transient {
        /// Last HTTP status seen, absent for connection failures.
        status: Option<u16>,
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Description of the last failure.
        message: String,
    },

    /// The remote system rejected the request with a non-retryable status.
    #[error("remote request rejected with status {status}: {body}")]
    Permanent {
        /// HTTP status returned by the remote system.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// Task creation returned without a usable task identifier.
    #[error("task creation failed: {0}")]
    TaskCreation(String),

    /// A response body did not have the expected shape.
    #[error("unexpected remote payload: {0}")]
    Decode(String),

    /// A request URL could not be built.
    #[error("invalid remote URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be configured.
    #[error("remote client misconfigured: {0}")]
    Configuration(String),
}

impl RemoteError {
    /// Returns `true` when the failure was caused by a retryable condition.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Returns `true` when no bearer token could be obtained, which stops
    /// the whole operation in progress.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns the HTTP status associated with the failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transient { status, .. } => *status,
            Self::Permanent { status, .. } => Some(*status),
            Self::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
