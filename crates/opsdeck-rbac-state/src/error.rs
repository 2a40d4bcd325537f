//! Error types for the state engine.

use opsdeck_rbac_api::ApiError;
use opsdeck_rbac_core::{EntityKind, ValidationError};
use thiserror::Error;

/// Errors raised by engine operations.
///
/// Nothing here is fatal to the engine: a failed reload or mutation leaves
/// cached state stale but never corrupt, and the caller simply re-triggers
/// the action. There are no automatic retries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A collection reload failed; the previous collection is retained.
    #[error("failed to load {kind} collection: {source}")]
    Load {
        kind: EntityKind,
        #[source]
        source: ApiError,
    },

    /// A local precondition failed; no remote call was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A remote mutation was issued and the server rejected it.
    #[error("{operation} failed: {source}")]
    Mutation {
        operation: String,
        #[source]
        source: ApiError,
    },

    /// The addressed owner entity is not in the repository.
    #[error("{kind} {id} is not in the repository")]
    UnknownOwner { kind: EntityKind, id: i64 },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
