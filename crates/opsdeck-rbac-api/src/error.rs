//! Error types for the remote API boundary.

use thiserror::Error;

/// Errors surfaced by the remote RBAC API.
///
/// Server messages are carried verbatim so the notifier can show them
/// unchanged. Every variant renders to a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never reached the server or the response was unusable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server rejected the request; message passed through verbatim.
    #[error("{0}")]
    Server(String),

    /// The addressed entity does not exist server-side.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
