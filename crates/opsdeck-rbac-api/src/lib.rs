//! # Opsdeck RBAC API
//!
//! The remote API contract for the Opsdeck RBAC console.
//!
//! ## Overview
//!
//! The console reaches its backend through the [`RbacApi`] trait: full
//! collection listings, entity creation and rename, the user enabled flag,
//! and pair-keyed assign/remove calls for the three many-to-many relations.
//! The wire format, base URL, and token handling live in the HTTP client
//! implementation, not here.
//!
//! ## Key Types
//!
//! - [`RbacApi`] - the async trait every backend implements
//! - [`MemoryApi`] - in-memory fake backend for tests
//! - [`ApiError`] - failures with human-readable, verbatim server messages

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{ApiError, Result};
pub use memory::MemoryApi;
pub use traits::RbacApi;
