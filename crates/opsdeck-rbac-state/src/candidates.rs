//! Candidate resolver: assignable-but-not-yet-assigned related entities.
//!
//! For a given owner and search text, the resolver computes the related
//! entities still available for assignment. The candidate list is the sole
//! gate preventing duplicate-assignment attempts, so invalidation is
//! proactive: a stale cache entry is a correctness bug, not a performance
//! concern.

use std::collections::{HashMap, HashSet};

use opsdeck_rbac_core::{
    Assignment, EntityKind, NamespaceId, NamespaceRef, PermissionId, ProcessId, RoleId, RoleRef,
    UserId,
};
use tracing::trace;

use crate::error::{EngineError, Result};
use crate::repository::EntityRepository;

/// A flattened Role→Permission candidate, tagged with its owning namespace.
///
/// A namespace with N permission definitions contributes N of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCandidate {
    pub id: PermissionId,
    pub permission_type: String,
    pub namespace_id: NamespaceId,
    pub namespace_name: String,
}

impl PermissionCandidate {
    /// The synthesized display label: `"<namespaceName>:<permissionType>"`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.namespace_name, self.permission_type)
    }
}

fn matches(needle_lower: &str, label: &str) -> bool {
    needle_lower.is_empty() || label.to_lowercase().contains(needle_lower)
}

/// Memoized candidate computation, keyed by `(ownerId, query)`.
///
/// Cache entries are removed whole — per owner on relationship mutation,
/// per relation on collection reload — never patched in place.
#[derive(Debug, Default)]
pub struct CandidateResolver {
    role_cache: HashMap<(UserId, String), Vec<RoleRef>>,
    permission_cache: HashMap<(RoleId, String), Vec<PermissionCandidate>>,
    namespace_cache: HashMap<(ProcessId, String), Vec<NamespaceRef>>,
}

impl CandidateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Roles assignable to a user: every role not already on the user,
    /// filtered by `query` against the role name, in roles-list order.
    pub fn roles_for_user(
        &mut self,
        repo: &EntityRepository,
        user: UserId,
        query: &str,
    ) -> Result<Vec<RoleRef>> {
        let key = (user, query.to_string());
        if let Some(hit) = self.role_cache.get(&key) {
            trace!(owner = %user, query, "candidate cache hit");
            return Ok(hit.clone());
        }

        let owner = repo.user(user).ok_or(EngineError::UnknownOwner {
            kind: EntityKind::User,
            id: user.raw(),
        })?;
        let assigned: HashSet<RoleId> = owner.roles.iter().map(|r| r.id).collect();

        let needle = query.to_lowercase();
        let candidates: Vec<RoleRef> = repo
            .roles()
            .iter()
            .filter(|role| !assigned.contains(&role.id) && matches(&needle, &role.name))
            .map(|role| RoleRef {
                id: role.id,
                name: role.name.clone(),
            })
            .collect();

        self.role_cache.insert(key, candidates.clone());
        Ok(candidates)
    }

    /// Permissions assignable to a role: the flattening of every permission
    /// definition across every namespace, minus the role's current set,
    /// filtered by `query` against the `"namespace:type"` label. Order is
    /// namespace-then-permission nesting order; no sorting.
    pub fn permissions_for_role(
        &mut self,
        repo: &EntityRepository,
        role: RoleId,
        query: &str,
    ) -> Result<Vec<PermissionCandidate>> {
        let key = (role, query.to_string());
        if let Some(hit) = self.permission_cache.get(&key) {
            trace!(owner = %role, query, "candidate cache hit");
            return Ok(hit.clone());
        }

        let owner = repo.role(role).ok_or(EngineError::UnknownOwner {
            kind: EntityKind::Role,
            id: role.raw(),
        })?;
        let assigned: HashSet<PermissionId> = owner.permissions.iter().map(|p| p.id).collect();

        let needle = query.to_lowercase();
        let mut candidates = Vec::new();
        for ns in repo.namespaces() {
            for def in &ns.permissions {
                if assigned.contains(&def.id) {
                    continue;
                }
                let candidate = PermissionCandidate {
                    id: def.id,
                    permission_type: def.permission_type.clone(),
                    namespace_id: ns.id,
                    namespace_name: ns.name.clone(),
                };
                if matches(&needle, &candidate.label()) {
                    candidates.push(candidate);
                }
            }
        }

        self.permission_cache.insert(key, candidates.clone());
        Ok(candidates)
    }

    /// Namespaces assignable to a process: every namespace other than the
    /// one currently holding the process, filtered by name.
    pub fn namespaces_for_process(
        &mut self,
        repo: &EntityRepository,
        process: ProcessId,
        query: &str,
    ) -> Result<Vec<NamespaceRef>> {
        let key = (process, query.to_string());
        if let Some(hit) = self.namespace_cache.get(&key) {
            trace!(owner = %process, query, "candidate cache hit");
            return Ok(hit.clone());
        }

        let owner = repo.process(process).ok_or(EngineError::UnknownOwner {
            kind: EntityKind::Process,
            id: process.raw(),
        })?;
        let current = owner.namespace.as_ref().map(|n| n.id);

        let needle = query.to_lowercase();
        let candidates: Vec<NamespaceRef> = repo
            .namespaces()
            .iter()
            .filter(|ns| Some(ns.id) != current && matches(&needle, &ns.name))
            .map(|ns| NamespaceRef {
                id: ns.id,
                name: ns.name.clone(),
            })
            .collect();

        self.namespace_cache.insert(key, candidates.clone());
        Ok(candidates)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invalidation
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop every cached query for the owner of a mutated relationship.
    pub fn invalidate_owner(&mut self, assignment: &Assignment) {
        match assignment {
            Assignment::RoleToUser { user, .. } => {
                self.role_cache.retain(|(owner, _), _| owner != user);
            }
            Assignment::PermissionToRole { role, .. } => {
                self.permission_cache.retain(|(owner, _), _| owner != role);
            }
            Assignment::NamespaceToProcess { process, .. } => {
                self.namespace_cache.retain(|(owner, _), _| owner != process);
            }
        }
        trace!(?assignment, "candidate cache invalidated for owner");
    }

    /// Drop every cache that reads from a reloaded collection, whether it
    /// is the owner's collection or the related one.
    pub fn invalidate_collection(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::User => {
                self.role_cache.clear();
            }
            EntityKind::Role => {
                // Owner collection for Role→Permission, related collection
                // for User→Role.
                self.role_cache.clear();
                self.permission_cache.clear();
            }
            EntityKind::Namespace => {
                // Source of both flattened permissions and namespace
                // candidates.
                self.permission_cache.clear();
                self.namespace_cache.clear();
            }
            EntityKind::Process => {
                self.namespace_cache.clear();
            }
        }
        trace!(%kind, "candidate caches invalidated for collection");
    }

    #[cfg(test)]
    fn cached_entries(&self) -> usize {
        self.role_cache.len() + self.permission_cache.len() + self.namespace_cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdeck_rbac_api::{MemoryApi, RbacApi};
    use opsdeck_rbac_core::{Namespace, PermissionDef, Process, Role, User};

    async fn repo_with(api: &MemoryApi) -> EntityRepository {
        let mut repo = EntityRepository::new();
        for kind in EntityKind::ALL {
            repo.reload(api, kind).await.unwrap();
        }
        repo
    }

    fn seeded_api() -> MemoryApi {
        let api = MemoryApi::new();
        api.seed_user(User {
            id: UserId::new(1),
            username: "fschilder".into(),
            display_name: None,
            enabled: true,
            roles: vec![RoleRef {
                id: RoleId::new(30),
                name: "administrador".into(),
            }],
        });
        api.seed_role(Role {
            id: RoleId::new(30),
            name: "administrador".into(),
            permissions: Vec::new(),
        });
        api.seed_role(Role {
            id: RoleId::new(31),
            name: "marketing".into(),
            permissions: Vec::new(),
        });
        api.seed_namespace(Namespace {
            id: NamespaceId::new(10),
            name: "sales".into(),
            processes: Vec::new(),
            permissions: vec![
                PermissionDef {
                    id: PermissionId::new(100),
                    permission_type: "read".into(),
                },
                PermissionDef {
                    id: PermissionId::new(101),
                    permission_type: "execute".into(),
                },
            ],
        });
        api.seed_process(Process {
            id: ProcessId::new(20),
            name: "billing".into(),
            description: None,
            namespace: None,
        });
        api
    }

    #[tokio::test]
    async fn test_assigned_roles_excluded() {
        let api = seeded_api();
        let repo = repo_with(&api).await;
        let mut resolver = CandidateResolver::new();

        let candidates = resolver
            .roles_for_user(&repo, UserId::new(1), "")
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "marketing");
    }

    #[tokio::test]
    async fn test_permission_flattening_and_label() {
        let api = seeded_api();
        let repo = repo_with(&api).await;
        let mut resolver = CandidateResolver::new();

        let candidates = resolver
            .permissions_for_role(&repo, RoleId::new(30), "")
            .unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].label(), "sales:read");
        assert_eq!(candidates[1].label(), "sales:execute");

        // Query matches against the synthesized label.
        let filtered = resolver
            .permissions_for_role(&repo, RoleId::new(30), "sales:exe")
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, PermissionId::new(101));
    }

    #[tokio::test]
    async fn test_current_namespace_excluded() {
        let api = seeded_api();
        api.assign_namespace(ProcessId::new(20), NamespaceId::new(10))
            .await
            .unwrap();
        let repo = repo_with(&api).await;
        let mut resolver = CandidateResolver::new();

        let candidates = resolver
            .namespaces_for_process(&repo, ProcessId::new(20), "")
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_owner_rejected() {
        let api = seeded_api();
        let repo = repo_with(&api).await;
        let mut resolver = CandidateResolver::new();

        let err = resolver
            .roles_for_user(&repo, UserId::new(999), "")
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownOwner { .. }));
    }

    #[tokio::test]
    async fn test_owner_invalidation_is_per_owner() {
        let api = seeded_api();
        api.seed_user(User {
            id: UserId::new(2),
            username: "ntrujillo".into(),
            display_name: None,
            enabled: true,
            roles: Vec::new(),
        });
        let repo = repo_with(&api).await;
        let mut resolver = CandidateResolver::new();

        resolver.roles_for_user(&repo, UserId::new(1), "").unwrap();
        resolver.roles_for_user(&repo, UserId::new(2), "").unwrap();
        assert_eq!(resolver.cached_entries(), 2);

        resolver.invalidate_owner(&Assignment::RoleToUser {
            user: UserId::new(1),
            role: RoleId::new(31),
        });
        assert_eq!(resolver.cached_entries(), 1);
    }

    #[tokio::test]
    async fn test_collection_reload_clears_dependent_caches() {
        let api = seeded_api();
        let repo = repo_with(&api).await;
        let mut resolver = CandidateResolver::new();

        resolver.roles_for_user(&repo, UserId::new(1), "").unwrap();
        resolver
            .permissions_for_role(&repo, RoleId::new(30), "")
            .unwrap();
        resolver
            .namespaces_for_process(&repo, ProcessId::new(20), "")
            .unwrap();
        assert_eq!(resolver.cached_entries(), 3);

        // Roles feed both the User→Role and Role→Permission caches.
        resolver.invalidate_collection(EntityKind::Role);
        assert_eq!(resolver.cached_entries(), 1);

        resolver.invalidate_collection(EntityKind::Process);
        assert_eq!(resolver.cached_entries(), 0);
    }
}
