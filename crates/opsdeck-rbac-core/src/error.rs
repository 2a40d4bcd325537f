//! Error types for the core data model.

use thiserror::Error;

use crate::types::EntityKind;

/// Local precondition failures.
///
/// A validation failure means the corresponding remote call is never
/// issued; it is surfaced synchronously to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("{0} name must not be empty")]
    EmptyName(EntityKind),
}

/// Result type for core validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
