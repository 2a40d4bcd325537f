//! Reload-cascade table.
//!
//! Every mutation triggers reloads of the collections whose contents or
//! derived labels it may have changed. The mapping lives in one explicit
//! table consulted by the mutator, rather than ad hoc reload calls
//! scattered per mutation, so the cascade is testable in isolation.

use std::collections::HashMap;

use opsdeck_rbac_core::{EntityKind, Relation};

/// What just happened, for cascade lookup purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeTrigger {
    /// A relationship was assigned or removed.
    Mutated(Relation),
    /// An entity was created.
    Created(EntityKind),
    /// An entity was renamed (or its description updated).
    Renamed(EntityKind),
}

/// The `{trigger -> collections to reload}` table.
///
/// Reload order matters for the rename cascades: the renamed collection
/// comes first so the dependent reload's derived-label rebuild sees the
/// fresh names.
#[derive(Debug)]
pub struct CascadeTable {
    reloads: HashMap<CascadeTrigger, Vec<EntityKind>>,
}

impl Default for CascadeTable {
    fn default() -> Self {
        let mut reloads = HashMap::new();

        reloads.insert(
            CascadeTrigger::Mutated(Relation::UserRole),
            vec![EntityKind::User],
        );
        reloads.insert(
            CascadeTrigger::Mutated(Relation::RolePermission),
            vec![EntityKind::Role],
        );
        // A process move also changes the old and new namespaces' process
        // lists.
        reloads.insert(
            CascadeTrigger::Mutated(Relation::ProcessNamespace),
            vec![EntityKind::Process, EntityKind::Namespace],
        );

        for kind in EntityKind::ALL {
            reloads.insert(CascadeTrigger::Created(kind), vec![kind]);
        }

        reloads.insert(CascadeTrigger::Renamed(EntityKind::User), vec![EntityKind::User]);
        // User rows display role names.
        reloads.insert(
            CascadeTrigger::Renamed(EntityKind::Role),
            vec![EntityKind::Role, EntityKind::User],
        );
        // Role permission labels embed namespace names.
        reloads.insert(
            CascadeTrigger::Renamed(EntityKind::Namespace),
            vec![EntityKind::Namespace, EntityKind::Role],
        );
        reloads.insert(
            CascadeTrigger::Renamed(EntityKind::Process),
            vec![EntityKind::Process, EntityKind::Namespace],
        );

        Self { reloads }
    }
}

impl CascadeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collections to reload after `trigger`, in order.
    pub fn reloads_for(&self, trigger: CascadeTrigger) -> &[EntityKind] {
        self.reloads
            .get(&trigger)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
