//! Entity repository: the in-memory cache of the four entity collections.
//!
//! Collections are populated by full reloads from the remote API; there is
//! no partial or delta sync. The repository is the only component that
//! writes into the collections — everything else reads references and
//! treats them as immutable between reloads.

use std::collections::HashMap;

use opsdeck_rbac_api::RbacApi;
use opsdeck_rbac_core::{
    EntityKind, Namespace, PermissionId, Process, ProcessId, Role, RoleId, User, UserId,
};
use tracing::debug;

use crate::error::{EngineError, Result};

/// In-memory cache of users, roles, namespaces, and processes, plus the
/// derived role-label projection.
#[derive(Debug, Default)]
pub struct EntityRepository {
    users: Vec<User>,
    roles: Vec<Role>,
    namespaces: Vec<Namespace>,
    processes: Vec<Process>,

    /// Derived projection: role id -> "namespace:permissionType" labels.
    /// Rebuilt whenever roles or namespaces are replaced, since permission
    /// labels embed namespace names.
    role_labels: HashMap<RoleId, Vec<String>>,
}

impl EntityRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reload
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the full collection for `kind` and replace the cached one.
    ///
    /// The replacement is a single assignment: readers never observe a
    /// partially-replaced collection. On failure the previous collection
    /// is left intact (fail-safe, not fail-clear).
    pub async fn reload<A: RbacApi + ?Sized>(&mut self, api: &A, kind: EntityKind) -> Result<()> {
        match kind {
            EntityKind::User => {
                self.users = api
                    .list_users()
                    .await
                    .map_err(|source| EngineError::Load { kind, source })?;
            }
            EntityKind::Role => {
                self.roles = api
                    .list_roles()
                    .await
                    .map_err(|source| EngineError::Load { kind, source })?;
                self.rebuild_role_labels();
            }
            EntityKind::Namespace => {
                self.namespaces = api
                    .list_namespaces()
                    .await
                    .map_err(|source| EngineError::Load { kind, source })?;
                self.rebuild_role_labels();
            }
            EntityKind::Process => {
                self.processes = api
                    .list_processes()
                    .await
                    .map_err(|source| EngineError::Load { kind, source })?;
            }
        }
        debug!(%kind, "collection reloaded");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn namespace(&self, id: opsdeck_rbac_core::NamespaceId) -> Option<&Namespace> {
        self.namespaces.iter().find(|n| n.id == id)
    }

    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        self.processes.iter().find(|p| p.id == id)
    }

    /// The derived permission labels for a role, in namespace-then-
    /// permission order.
    pub fn role_labels(&self, id: RoleId) -> &[String] {
        self.role_labels.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The labels joined for display on a role row.
    pub fn role_label_line(&self, id: RoleId) -> String {
        self.role_labels(id).join(", ")
    }

    /// Display label for a permission: `"namespace:permissionType"`.
    ///
    /// Resolved against the namespace collection first (freshest names);
    /// falls back to the denormalized references on role grants when the
    /// permission is no longer enumerable from any namespace.
    pub fn permission_label(&self, id: PermissionId) -> Option<String> {
        for ns in &self.namespaces {
            for def in &ns.permissions {
                if def.id == id {
                    return Some(format!("{}:{}", ns.name, def.permission_type));
                }
            }
        }
        for role in &self.roles {
            for perm in &role.permissions {
                if perm.id == id {
                    if let Some(ns) = perm.namespaces.first() {
                        return Some(format!("{}:{}", ns.name, perm.permission_type));
                    }
                }
            }
        }
        None
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sanctioned Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Flip a user's enabled flag in place.
    ///
    /// The enabled toggle is the one mutation applied optimistically after
    /// a successful remote call instead of via a full reload.
    pub fn apply_enabled(&mut self, id: UserId, enabled: bool) {
        if let Some(user) = self.users.iter_mut().find(|u| u.id == id) {
            user.enabled = enabled;
        }
    }

    fn rebuild_role_labels(&mut self) {
        let ns_names: HashMap<_, _> = self
            .namespaces
            .iter()
            .map(|ns| (ns.id, ns.name.as_str()))
            .collect();

        let mut labels = HashMap::with_capacity(self.roles.len());
        for role in &self.roles {
            let mut role_labels = Vec::new();
            for perm in &role.permissions {
                for ns_ref in &perm.namespaces {
                    // Prefer the freshest namespace name over the
                    // denormalized one carried on the grant.
                    let name = ns_names.get(&ns_ref.id).copied().unwrap_or(&ns_ref.name);
                    role_labels.push(format!("{}:{}", name, perm.permission_type));
                }
            }
            labels.insert(role.id, role_labels);
        }
        self.role_labels = labels;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdeck_rbac_api::{ApiError, MemoryApi};
    use opsdeck_rbac_core::{NamespaceId, NamespaceRef, Permission, PermissionDef};

    fn sales_namespace() -> Namespace {
        Namespace {
            id: NamespaceId::new(10),
            name: "sales".into(),
            processes: Vec::new(),
            permissions: vec![PermissionDef {
                id: PermissionId::new(100),
                permission_type: "read".into(),
            }],
        }
    }

    fn admin_role_with_grant() -> Role {
        Role {
            id: RoleId::new(1),
            name: "admin".into(),
            permissions: vec![Permission {
                id: PermissionId::new(100),
                permission_type: "read".into(),
                namespaces: vec![NamespaceRef {
                    id: NamespaceId::new(10),
                    name: "sales".into(),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_reload_replaces_collection() {
        let api = MemoryApi::new();
        api.seed_role(Role {
            id: RoleId::new(1),
            name: "admin".into(),
            permissions: Vec::new(),
        });

        let mut repo = EntityRepository::new();
        repo.reload(&api, EntityKind::Role).await.unwrap();
        assert_eq!(repo.roles().len(), 1);
        assert_eq!(repo.roles()[0].name, "admin");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_stale_data() {
        let api = MemoryApi::new();
        api.seed_user(User {
            id: UserId::new(1),
            username: "fschilder".into(),
            display_name: None,
            enabled: true,
            roles: Vec::new(),
        });

        let mut repo = EntityRepository::new();
        repo.reload(&api, EntityKind::User).await.unwrap();
        assert_eq!(repo.users().len(), 1);

        api.inject_failure(ApiError::Transport("connection refused".into()));
        let err = repo.reload(&api, EntityKind::User).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Load {
                kind: EntityKind::User,
                ..
            }
        ));
        // Stale but present beats empty.
        assert_eq!(repo.users().len(), 1);
    }

    #[tokio::test]
    async fn test_role_labels_resolve_fresh_namespace_names() {
        let api = MemoryApi::new();
        api.seed_namespace(sales_namespace());
        api.seed_role(admin_role_with_grant());

        let mut repo = EntityRepository::new();
        repo.reload(&api, EntityKind::Namespace).await.unwrap();
        repo.reload(&api, EntityKind::Role).await.unwrap();
        assert_eq!(repo.role_labels(RoleId::new(1)), ["sales:read"]);
        assert_eq!(repo.role_label_line(RoleId::new(1)), "sales:read");

        // Rename server-side, reload namespaces only: the projection must
        // pick up the new name even though the role grant still carries
        // the stale denormalized one.
        api.rename_namespace(NamespaceId::new(10), "sales-eu")
            .await
            .unwrap();
        repo.reload(&api, EntityKind::Namespace).await.unwrap();
        assert_eq!(repo.role_labels(RoleId::new(1)), ["sales-eu:read"]);
    }

    #[tokio::test]
    async fn test_permission_label_lookup() {
        let api = MemoryApi::new();
        api.seed_namespace(sales_namespace());

        let mut repo = EntityRepository::new();
        repo.reload(&api, EntityKind::Namespace).await.unwrap();
        assert_eq!(
            repo.permission_label(PermissionId::new(100)).as_deref(),
            Some("sales:read")
        );
        assert_eq!(repo.permission_label(PermissionId::new(999)), None);
    }

    #[tokio::test]
    async fn test_apply_enabled() {
        let api = MemoryApi::new();
        api.seed_user(User {
            id: UserId::new(1),
            username: "ntrujillo".into(),
            display_name: None,
            enabled: true,
            roles: Vec::new(),
        });

        let mut repo = EntityRepository::new();
        repo.reload(&api, EntityKind::User).await.unwrap();
        repo.apply_enabled(UserId::new(1), false);
        assert!(!repo.user(UserId::new(1)).unwrap().enabled);
    }
}
