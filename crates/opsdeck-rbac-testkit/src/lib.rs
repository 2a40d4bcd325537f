//! # Opsdeck RBAC Testkit
//!
//! Testing utilities for the Opsdeck RBAC console.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a pre-seeded [`ConsoleFixture`] over the in-memory
//!   backend, plus a [`RecordingNotifier`] for asserting on feedback
//! - **Generators**: proptest strategies for entities and input text
//!
//! ## Fixtures
//!
//! ```rust,ignore
//! use opsdeck_rbac_testkit::ConsoleFixture;
//!
//! let mut fixture = ConsoleFixture::new().await;
//! fixture.console.set_enabled(ConsoleFixture::FSCHILDER, false).await?;
//! assert_eq!(fixture.notifier.successes().len(), 1);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use opsdeck_rbac_testkit::generators;
//!
//! proptest! {
//!     #[test]
//!     fn names_survive_trimming(name in generators::name()) {
//!         prop_assert_eq!(name.trim(), name.as_str());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{ConsoleFixture, RecordingNotifier};
