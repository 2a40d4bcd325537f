//! RbacApi trait: the narrow contract against the remote RBAC backend.
//!
//! The wire format and authentication belong to the HTTP client layer and
//! are deliberately absent here. The engine only depends on this trait;
//! implementations include the production HTTP client and the in-memory
//! fake used by tests.

use async_trait::async_trait;
use opsdeck_rbac_core::{
    Namespace, NamespaceId, NewUser, Permission, Process, ProcessId, Role, RoleId, PermissionId,
    User, UserId,
};

use crate::error::Result;

/// Async interface to the remote RBAC API.
///
/// # Design Notes
///
/// - **Full-collection lists**: every list call returns the whole
///   collection, no pagination. The engine re-syncs by reloading rather
///   than applying local deltas.
/// - **Pair-keyed relationship calls**: assign/remove take the two ids and
///   return no content on success. Retrying an assign after a prior
///   success is a harmless no-op server-side.
/// - **Verbatim failures**: any failing call must map to a distinguishable
///   [`ApiError`](crate::ApiError) with a human-readable message; the
///   engine surfaces it without crashing.
#[async_trait]
pub trait RbacApi: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // List Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// List all users.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// List all roles with their assigned permissions.
    async fn list_roles(&self) -> Result<Vec<Role>>;

    /// List all namespaces with their processes and permission definitions.
    async fn list_namespaces(&self) -> Result<Vec<Namespace>>;

    /// List all process definitions.
    async fn list_processes(&self) -> Result<Vec<Process>>;

    /// List every permission across all namespaces.
    async fn list_permissions(&self) -> Result<Vec<Permission>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Fetch By Id
    // ─────────────────────────────────────────────────────────────────────────
    //
    // Kept for detail views; the engine itself refreshes via full reloads.

    /// Fetch a single user.
    async fn get_user(&self, id: UserId) -> Result<User>;

    /// Fetch a single role.
    async fn get_role(&self, id: RoleId) -> Result<Role>;

    /// Fetch a single namespace.
    async fn get_namespace(&self, id: NamespaceId) -> Result<Namespace>;

    // ─────────────────────────────────────────────────────────────────────────
    // Create Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a user. Returns the server-assigned record.
    async fn create_user(&self, new: &NewUser) -> Result<User>;

    /// Create a role with the given name.
    async fn create_role(&self, name: &str) -> Result<Role>;

    /// Create a namespace with the given name.
    async fn create_namespace(&self, name: &str) -> Result<Namespace>;

    // ─────────────────────────────────────────────────────────────────────────
    // Update Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Update a user's display name (the username is immutable).
    async fn rename_user(&self, id: UserId, display_name: &str) -> Result<()>;

    /// Rename a role.
    async fn rename_role(&self, id: RoleId, name: &str) -> Result<()>;

    /// Rename a namespace.
    async fn rename_namespace(&self, id: NamespaceId, name: &str) -> Result<()>;

    /// Update a process's name and description in one call.
    /// `description: None` clears the description server-side.
    async fn update_process(
        &self,
        id: ProcessId,
        name: &str,
        description: Option<&str>,
    ) -> Result<()>;

    /// Toggle a user's enabled flag.
    async fn set_user_enabled(&self, id: UserId, enabled: bool) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Assign a role to a user.
    async fn assign_role(&self, user: UserId, role: RoleId) -> Result<()>;

    /// Remove a role from a user.
    async fn remove_role(&self, user: UserId, role: RoleId) -> Result<()>;

    /// Assign a permission to a role.
    async fn assign_permission(&self, role: RoleId, permission: PermissionId) -> Result<()>;

    /// Remove a permission from a role.
    async fn remove_permission(&self, role: RoleId, permission: PermissionId) -> Result<()>;

    /// Assign a process to a namespace, replacing any previous assignment.
    async fn assign_namespace(&self, process: ProcessId, namespace: NamespaceId) -> Result<()>;

    /// Remove a process from its namespace.
    async fn remove_namespace(&self, process: ProcessId, namespace: NamespaceId) -> Result<()>;
}
