//! Filter engine: per-collection free-text queries.
//!
//! Each collection tab keeps its own case-insensitive substring query,
//! independent of edit state. Switching the active tab clears every query
//! so a stale filter from one tab never silently applies when the operator
//! returns to another.

use std::collections::HashMap;

use opsdeck_rbac_core::{EntityKind, Namespace, Process, Role, User};

/// Per-collection search queries and the active tab.
#[derive(Debug)]
pub struct FilterEngine {
    queries: HashMap<EntityKind, String>,
    active: EntityKind,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self {
            queries: HashMap::new(),
            active: EntityKind::User,
        }
    }
}

fn matches(needle_lower: &str, label: &str) -> bool {
    needle_lower.is_empty() || label.to_lowercase().contains(needle_lower)
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently active collection tab.
    pub fn active(&self) -> EntityKind {
        self.active
    }

    /// Store the query for one collection.
    pub fn set_query(&mut self, kind: EntityKind, text: impl Into<String>) {
        self.queries.insert(kind, text.into());
    }

    /// The stored query for a collection (empty if none).
    pub fn query(&self, kind: EntityKind) -> &str {
        self.queries.get(&kind).map(String::as_str).unwrap_or("")
    }

    /// Switch the active tab, clearing all four queries.
    pub fn switch_tab(&mut self, kind: EntityKind) {
        self.queries.clear();
        self.active = kind;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Filtered Views
    // ─────────────────────────────────────────────────────────────────────────
    //
    // Views preserve collection order; an empty query yields the whole
    // collection. Matching is a case-insensitive substring test against
    // the primary display name.

    pub fn filtered_users<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        let q = self.query(EntityKind::User).to_lowercase();
        users.iter().filter(|u| matches(&q, u.label())).collect()
    }

    pub fn filtered_roles<'a>(&self, roles: &'a [Role]) -> Vec<&'a Role> {
        let q = self.query(EntityKind::Role).to_lowercase();
        roles.iter().filter(|r| matches(&q, r.label())).collect()
    }

    pub fn filtered_namespaces<'a>(&self, namespaces: &'a [Namespace]) -> Vec<&'a Namespace> {
        let q = self.query(EntityKind::Namespace).to_lowercase();
        namespaces
            .iter()
            .filter(|n| matches(&q, n.label()))
            .collect()
    }

    pub fn filtered_processes<'a>(&self, processes: &'a [Process]) -> Vec<&'a Process> {
        let q = self.query(EntityKind::Process).to_lowercase();
        processes
            .iter()
            .filter(|p| matches(&q, p.label()))
            .collect()
    }
}
