//! # Opsdeck RBAC State
//!
//! The state engine behind the Opsdeck RBAC console: it owns the cached
//! entity collections and every piece of per-tab, per-row edit state the
//! presentation layer consumes. No rendering, no HTTP — state, caching,
//! and invalidation only.
//!
//! ## Components
//!
//! - [`EntityRepository`] - per-collection cache, full reloads, derived
//!   role-label projection
//! - [`FilterEngine`] - per-tab free-text queries over cached collections
//! - [`CandidateResolver`] - memoized assignable-entity computation with
//!   proactive invalidation
//! - [`EditSessionController`] - single-slot inline-edit state machine
//! - [`CascadeTable`] - the explicit `{mutation -> reloads}` dependency
//!   table
//! - [`Notify`] - mutation feedback contract
//!
//! Reads flow repository → filters → resolver; writes flow through the
//! console facade (see the `opsdeck-rbac` crate), which consults the
//! cascade table and invalidates the resolver after every mutation.

pub mod candidates;
pub mod cascade;
pub mod error;
pub mod filter;
pub mod notify;
pub mod repository;
pub mod session;

pub use candidates::{CandidateResolver, PermissionCandidate};
pub use cascade::{CascadeTable, CascadeTrigger};
pub use error::{EngineError, Result};
pub use filter::FilterEngine;
pub use notify::{Notify, TracingNotifier};
pub use repository::EntityRepository;
pub use session::{EditSessionController, EditSessions, EditState, FocusRequest};
