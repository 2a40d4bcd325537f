//! In-memory implementation of the RbacApi trait.
//!
//! This is primarily for testing. It behaves like the real backend:
//! server-assigned ids, denormalized names kept in sync on rename, and a
//! process re-assignment that replaces the previous namespace. It also
//! records every call and supports one-shot failure injection so tests can
//! observe the engine's failure handling.

use std::sync::RwLock;

use async_trait::async_trait;
use opsdeck_rbac_core::{
    Namespace, NamespaceId, NamespaceRef, NewUser, Permission, PermissionId, Process, ProcessId,
    ProcessRef, Role, RoleId, RoleRef, User, UserId,
};

use crate::error::{ApiError, Result};
use crate::traits::RbacApi;

/// In-memory fake RBAC backend.
///
/// All data is lost when dropped. Thread-safe via RwLock.
pub struct MemoryApi {
    inner: RwLock<MemoryApiInner>,
}

struct MemoryApiInner {
    users: Vec<User>,
    roles: Vec<Role>,
    namespaces: Vec<Namespace>,
    processes: Vec<Process>,

    /// Next server-assigned id, shared across entity kinds like a sequence.
    next_id: i64,

    /// Method names in call order.
    calls: Vec<String>,

    /// Error returned by the next call, then cleared.
    fail_next: Option<ApiError>,
}

impl MemoryApi {
    /// Create an empty fake backend.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryApiInner {
                users: Vec::new(),
                roles: Vec::new(),
                namespaces: Vec::new(),
                processes: Vec::new(),
                next_id: 1,
                calls: Vec::new(),
                fail_next: None,
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Test Controls
    // ─────────────────────────────────────────────────────────────────────────

    /// Seed a user, adjusting the id sequence past its id.
    pub fn seed_user(&self, user: User) {
        let mut inner = self.inner.write().unwrap();
        inner.next_id = inner.next_id.max(user.id.raw() + 1);
        inner.users.push(user);
    }

    /// Seed a role.
    pub fn seed_role(&self, role: Role) {
        let mut inner = self.inner.write().unwrap();
        inner.next_id = inner.next_id.max(role.id.raw() + 1);
        inner.roles.push(role);
    }

    /// Seed a namespace. Permission ids also advance the id sequence.
    pub fn seed_namespace(&self, namespace: Namespace) {
        let mut inner = self.inner.write().unwrap();
        inner.next_id = inner.next_id.max(namespace.id.raw() + 1);
        for perm in &namespace.permissions {
            inner.next_id = inner.next_id.max(perm.id.raw() + 1);
        }
        inner.namespaces.push(namespace);
    }

    /// Seed a process.
    pub fn seed_process(&self, process: Process) {
        let mut inner = self.inner.write().unwrap();
        inner.next_id = inner.next_id.max(process.id.raw() + 1);
        inner.processes.push(process);
    }

    /// Make the next call (whatever it is) fail with `error`.
    pub fn inject_failure(&self, error: ApiError) {
        self.inner.write().unwrap().fail_next = Some(error);
    }

    /// Method names recorded so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.read().unwrap().calls.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.inner.write().unwrap().calls.clear();
    }
}

impl Default for MemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryApiInner {
    fn enter(&mut self, method: &str) -> Result<()> {
        self.calls.push(method.to_string());
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn alloc_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn user_mut(&mut self, id: UserId) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ApiError::NotFound {
                kind: "user",
                id: id.raw(),
            })
    }

    fn role_mut(&mut self, id: RoleId) -> Result<&mut Role> {
        self.roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::NotFound {
                kind: "role",
                id: id.raw(),
            })
    }

    fn namespace_mut(&mut self, id: NamespaceId) -> Result<&mut Namespace> {
        self.namespaces
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(ApiError::NotFound {
                kind: "namespace",
                id: id.raw(),
            })
    }

    fn process_mut(&mut self, id: ProcessId) -> Result<&mut Process> {
        self.processes
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::NotFound {
                kind: "process",
                id: id.raw(),
            })
    }

    /// Resolve a permission id to a full record with its owning namespaces.
    fn permission(&self, id: PermissionId) -> Result<Permission> {
        let mut permission_type = None;
        let mut namespaces = Vec::new();
        for ns in &self.namespaces {
            for def in &ns.permissions {
                if def.id == id {
                    permission_type = Some(def.permission_type.clone());
                    namespaces.push(NamespaceRef {
                        id: ns.id,
                        name: ns.name.clone(),
                    });
                }
            }
        }
        match permission_type {
            Some(permission_type) => Ok(Permission {
                id,
                permission_type,
                namespaces,
            }),
            None => Err(ApiError::NotFound {
                kind: "permission",
                id: id.raw(),
            }),
        }
    }

    /// Drop `process` from every namespace's process list.
    fn detach_process(&mut self, process: ProcessId) {
        for ns in &mut self.namespaces {
            ns.processes.retain(|p| p.id != process);
        }
    }
}

#[async_trait]
impl RbacApi for MemoryApi {
    async fn list_users(&self) -> Result<Vec<User>> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("list_users")?;
        Ok(inner.users.clone())
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("list_roles")?;
        Ok(inner.roles.clone())
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("list_namespaces")?;
        Ok(inner.namespaces.clone())
    }

    async fn list_processes(&self) -> Result<Vec<Process>> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("list_processes")?;
        Ok(inner.processes.clone())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("list_permissions")?;
        let ids: Vec<PermissionId> = inner
            .namespaces
            .iter()
            .flat_map(|ns| ns.permissions.iter().map(|def| def.id))
            .collect();
        let mut out = Vec::new();
        for id in ids {
            if out.iter().any(|p: &Permission| p.id == id) {
                continue;
            }
            out.push(inner.permission(id)?);
        }
        Ok(out)
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("get_user")?;
        inner.user_mut(id).map(|u| u.clone())
    }

    async fn get_role(&self, id: RoleId) -> Result<Role> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("get_role")?;
        inner.role_mut(id).map(|r| r.clone())
    }

    async fn get_namespace(&self, id: NamespaceId) -> Result<Namespace> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("get_namespace")?;
        inner.namespace_mut(id).map(|n| n.clone())
    }

    async fn create_user(&self, new: &NewUser) -> Result<User> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("create_user")?;
        if inner.users.iter().any(|u| u.username == new.username) {
            return Err(ApiError::Server(format!(
                "username '{}' is already taken",
                new.username
            )));
        }
        let user = User {
            id: UserId::new(inner.alloc_id()),
            username: new.username.clone(),
            display_name: new.display_name.clone(),
            enabled: true,
            roles: Vec::new(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn create_role(&self, name: &str) -> Result<Role> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("create_role")?;
        let role = Role {
            id: RoleId::new(inner.alloc_id()),
            name: name.to_string(),
            permissions: Vec::new(),
        };
        inner.roles.push(role.clone());
        Ok(role)
    }

    async fn create_namespace(&self, name: &str) -> Result<Namespace> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("create_namespace")?;
        let namespace = Namespace {
            id: NamespaceId::new(inner.alloc_id()),
            name: name.to_string(),
            processes: Vec::new(),
            permissions: Vec::new(),
        };
        inner.namespaces.push(namespace.clone());
        Ok(namespace)
    }

    async fn rename_user(&self, id: UserId, display_name: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("rename_user")?;
        inner.user_mut(id)?.display_name = Some(display_name.to_string());
        Ok(())
    }

    async fn rename_role(&self, id: RoleId, name: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("rename_role")?;
        inner.role_mut(id)?.name = name.to_string();
        // Denormalized role names on user rows follow the rename.
        for user in &mut inner.users {
            for role_ref in &mut user.roles {
                if role_ref.id == id {
                    role_ref.name = name.to_string();
                }
            }
        }
        Ok(())
    }

    async fn rename_namespace(&self, id: NamespaceId, name: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("rename_namespace")?;
        inner.namespace_mut(id)?.name = name.to_string();
        for process in &mut inner.processes {
            if let Some(ns_ref) = process.namespace.as_mut() {
                if ns_ref.id == id {
                    ns_ref.name = name.to_string();
                }
            }
        }
        for role in &mut inner.roles {
            for perm in &mut role.permissions {
                for ns_ref in &mut perm.namespaces {
                    if ns_ref.id == id {
                        ns_ref.name = name.to_string();
                    }
                }
            }
        }
        Ok(())
    }

    async fn update_process(
        &self,
        id: ProcessId,
        name: &str,
        description: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("update_process")?;
        let process = inner.process_mut(id)?;
        process.name = name.to_string();
        process.description = description.map(String::from);
        let name = name.to_string();
        for ns in &mut inner.namespaces {
            for p_ref in &mut ns.processes {
                if p_ref.id == id {
                    p_ref.name = name.clone();
                }
            }
        }
        Ok(())
    }

    async fn set_user_enabled(&self, id: UserId, enabled: bool) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("set_user_enabled")?;
        inner.user_mut(id)?.enabled = enabled;
        Ok(())
    }

    async fn assign_role(&self, user: UserId, role: RoleId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("assign_role")?;
        let role_ref = {
            let role = inner.role_mut(role)?;
            RoleRef {
                id: role.id,
                name: role.name.clone(),
            }
        };
        let user = inner.user_mut(user)?;
        // Re-assigning an existing pair is a no-op, not an error.
        if !user.roles.iter().any(|r| r.id == role_ref.id) {
            user.roles.push(role_ref);
        }
        Ok(())
    }

    async fn remove_role(&self, user: UserId, role: RoleId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("remove_role")?;
        inner.user_mut(user)?.roles.retain(|r| r.id != role);
        Ok(())
    }

    async fn assign_permission(&self, role: RoleId, permission: PermissionId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("assign_permission")?;
        let full = inner.permission(permission)?;
        let role = inner.role_mut(role)?;
        if !role.permissions.iter().any(|p| p.id == permission) {
            role.permissions.push(full);
        }
        Ok(())
    }

    async fn remove_permission(&self, role: RoleId, permission: PermissionId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("remove_permission")?;
        inner
            .role_mut(role)?
            .permissions
            .retain(|p| p.id != permission);
        Ok(())
    }

    async fn assign_namespace(&self, process: ProcessId, namespace: NamespaceId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("assign_namespace")?;
        let ns_ref = {
            let ns = inner.namespace_mut(namespace)?;
            NamespaceRef {
                id: ns.id,
                name: ns.name.clone(),
            }
        };
        let (p_id, p_name) = {
            let p = inner.process_mut(process)?;
            p.namespace = Some(ns_ref);
            (p.id, p.name.clone())
        };
        // One namespace per process: replace any previous assignment.
        inner.detach_process(process);
        inner
            .namespace_mut(namespace)?
            .processes
            .push(ProcessRef {
                id: p_id,
                name: p_name,
            });
        Ok(())
    }

    async fn remove_namespace(&self, process: ProcessId, namespace: NamespaceId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.enter("remove_namespace")?;
        {
            let p = inner.process_mut(process)?;
            if p.namespace.as_ref().map(|n| n.id) == Some(namespace) {
                p.namespace = None;
            }
        }
        inner
            .namespace_mut(namespace)?
            .processes
            .retain(|p| p.id != process);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdeck_rbac_core::PermissionDef;

    fn seeded() -> MemoryApi {
        let api = MemoryApi::new();
        api.seed_user(User {
            id: UserId::new(1),
            username: "fschilder".into(),
            display_name: None,
            enabled: true,
            roles: Vec::new(),
        });
        api.seed_role(Role {
            id: RoleId::new(2),
            name: "administrador".into(),
            permissions: Vec::new(),
        });
        api.seed_namespace(Namespace {
            id: NamespaceId::new(10),
            name: "sales".into(),
            processes: Vec::new(),
            permissions: vec![PermissionDef {
                id: PermissionId::new(100),
                permission_type: "read".into(),
            }],
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
    async fn test_assign_role_idempotent() {
        let api = seeded();
        api.assign_role(UserId::new(1), RoleId::new(2)).await.unwrap();
        api.assign_role(UserId::new(1), RoleId::new(2)).await.unwrap();

        let users = api.list_users().await.unwrap();
        assert_eq!(users[0].roles.len(), 1);
    }

    #[tokio::test]
    async fn test_assign_namespace_replaces_previous() {
        let api = seeded();
        api.seed_namespace(Namespace {
            id: NamespaceId::new(11),
            name: "ops".into(),
            processes: Vec::new(),
            permissions: Vec::new(),
        });

        api.assign_namespace(ProcessId::new(20), NamespaceId::new(10))
            .await
            .unwrap();
        api.assign_namespace(ProcessId::new(20), NamespaceId::new(11))
            .await
            .unwrap();

        let processes = api.list_processes().await.unwrap();
        assert_eq!(
            processes[0].namespace.as_ref().unwrap().id,
            NamespaceId::new(11)
        );
        let namespaces = api.list_namespaces().await.unwrap();
        let sales = namespaces.iter().find(|n| n.id == NamespaceId::new(10)).unwrap();
        assert!(sales.processes.is_empty());
        let ops = namespaces.iter().find(|n| n.id == NamespaceId::new(11)).unwrap();
        assert_eq!(ops.processes.len(), 1);
    }

    #[tokio::test]
    async fn test_assign_permission_carries_namespace_refs() {
        let api = seeded();
        api.assign_permission(RoleId::new(2), PermissionId::new(100))
            .await
            .unwrap();

        let roles = api.list_roles().await.unwrap();
        let perm = &roles[0].permissions[0];
        assert_eq!(perm.permission_type, "read");
        assert_eq!(perm.namespaces[0].name, "sales");
    }

    #[tokio::test]
    async fn test_rename_role_updates_user_refs() {
        let api = seeded();
        api.assign_role(UserId::new(1), RoleId::new(2)).await.unwrap();
        api.rename_role(RoleId::new(2), "admin").await.unwrap();

        let users = api.list_users().await.unwrap();
        assert_eq!(users[0].roles[0].name, "admin");
    }

    #[tokio::test]
    async fn test_failure_injection_is_one_shot() {
        let api = seeded();
        api.inject_failure(ApiError::Server("boom".into()));

        assert!(api.list_users().await.is_err());
        assert!(api.list_users().await.is_ok());
    }

    #[tokio::test]
    async fn test_call_log_records_methods() {
        let api = seeded();
        let _ = api.list_roles().await;
        let _ = api.set_user_enabled(UserId::new(1), false).await;
        assert_eq!(api.calls(), vec!["list_roles", "set_user_enabled"]);
    }

    #[tokio::test]
    async fn test_create_user_allocates_id() {
        let api = seeded();
        let user = api
            .create_user(&NewUser {
                username: "ntrujillo".into(),
                password: "pw".into(),
                display_name: Some("N. Trujillo".into()),
            })
            .await
            .unwrap();
        assert!(user.id.raw() > 100); // past the seeded permission id
        assert!(user.enabled);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let api = seeded();
        let err = api
            .create_user(&NewUser {
                username: "fschilder".into(),
                password: "pw".into(),
                display_name: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
    }
}
