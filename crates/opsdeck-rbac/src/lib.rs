//! opsdeck-rbac: relationship management for the OpsDeck admin console.
//!
//! # Overview
//!
//! The console administers four entity collections — users, roles,
//! namespaces, and processes — and the three relationships between them:
//! roles on users, permissions on roles, and a namespace on a process.
//! This umbrella crate ties the building blocks together:
//!
//! - [`opsdeck_rbac_core`]: entity types, ids, and input validation
//! - [`opsdeck_rbac_api`]: the [`RbacApi`] backend trait and an in-memory
//!   implementation for tests
//! - [`opsdeck_rbac_state`]: repository, filters, candidate resolution,
//!   edit sessions, and the cascade table
//!
//! # Usage
//!
//! ```no_run
//! use opsdeck_rbac::{Console, MemoryApi};
//!
//! # async fn demo() -> opsdeck_rbac::Result<()> {
//! let mut console = Console::new(MemoryApi::new());
//! console.initialize().await?;
//!
//! for user in console.filtered_users() {
//!     println!("{} ({})", user.username, user.enabled);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Design Notes
//!
//! Every relationship mutation is pessimistic: the remote call completes
//! first and local state only changes on success. The one exception is the
//! user enabled flag, which is patched in place after the call instead of
//! reloading the collection.

mod console;

pub use console::Console;

pub use opsdeck_rbac_api::{ApiError, MemoryApi, RbacApi};
pub use opsdeck_rbac_core::{
    Assignment, EntityKind, Namespace, NamespaceId, NamespaceRef, NewUser, Permission,
    PermissionDef, PermissionId, Process, ProcessId, ProcessRef, Relation, Role, RoleId, RoleRef,
    User, UserId, ValidationError,
};
pub use opsdeck_rbac_state::{
    CandidateResolver, CascadeTable, CascadeTrigger, EditSessionController, EditSessions,
    EditState, EngineError, EntityRepository, FilterEngine, FocusRequest, Notify,
    PermissionCandidate, Result, TracingNotifier,
};
