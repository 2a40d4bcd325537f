//! # Opsdeck RBAC Core
//!
//! Pure data model for the Opsdeck RBAC console: entity records, strongly
//! typed identifiers, and client-side validation.
//!
//! This crate contains no I/O. It is shared by the API boundary, the state
//! engine, and the console facade.
//!
//! ## Key Types
//!
//! - [`User`], [`Role`], [`Namespace`], [`Process`] - the four entity
//!   collections, exactly as the remote API returns them
//! - [`Permission`] - a permission with its owning namespace references
//! - [`EntityKind`] - discriminator for the four collections
//! - [`Assignment`] - a relationship edit resolved to typed ids

pub mod error;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use types::{
    Assignment, EntityKind, Namespace, NamespaceId, NamespaceRef, NewUser, Permission,
    PermissionDef, PermissionId, Process, ProcessId, ProcessRef, Relation, Role, RoleId, RoleRef,
    User, UserId,
};
pub use validation::{validate_name, validate_new_user};
