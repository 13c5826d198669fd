//! Error types for the credential service client.
//!
//! # Design
//! Local validation failures (`InvalidArgument`) are raised before any
//! request is built, so callers can rely on "no network call happened".
//! Transport failures are carried through untouched. Every non-2xx response
//! lands in `Remote` with the status and, when the service sent one, the
//! decoded JSON error document; no status code gets special treatment.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `CredentialServiceClient` and its request builders.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An argument was rejected locally; no request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport failed to complete the round-trip.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with a non-2xx status.
    #[error("remote service returned HTTP {status}")]
    Remote {
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// An operation name did not resolve to any known operation.
    #[error("call to undefined method {0}")]
    UnknownMethod(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into an object.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Wrap any transport-level error.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ApiError::Transport(err.into())
    }

    /// HTTP status of a `Remote` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
