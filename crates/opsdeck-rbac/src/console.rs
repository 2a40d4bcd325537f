//! The Console: unified API for the RBAC administration core.
//!
//! The Console brings together the entity repository, filter engine,
//! candidate resolver, and edit sessions behind one facade, and implements
//! the relationship mutator: every write goes to the remote API first,
//! and local state only moves on success — cache invalidation, slot
//! clearing, session transition, then the cascade reloads.

use std::sync::Arc;

use opsdeck_rbac_api::RbacApi;
use opsdeck_rbac_core::{
    validate_name, validate_new_user, Assignment, EntityKind, Namespace, NamespaceId,
    NamespaceRef, NewUser, Process, ProcessId, Role, RoleId, RoleRef, User, UserId,
};
use opsdeck_rbac_state::{
    CandidateResolver, CascadeTable, CascadeTrigger, EditSessions, EntityRepository, FilterEngine,
    Notify, PermissionCandidate, TracingNotifier,
};
use opsdeck_rbac_state::{EngineError, Result};
use tracing::debug;

/// The main console struct.
///
/// Owns the only mutable copy of console state. All remote calls are
/// async and awaited to completion; read-side views are synchronous over
/// already-cached data and never suspend.
pub struct Console<A: RbacApi> {
    /// The remote backend.
    api: Arc<A>,
    /// Mutation feedback sink.
    notifier: Arc<dyn Notify>,
    /// The four entity collections plus derived projections.
    repository: EntityRepository,
    /// Per-tab search queries.
    filters: FilterEngine,
    /// Memoized assignable-entity computation.
    resolver: CandidateResolver,
    /// Single-slot inline edit state, one per owning collection.
    sessions: EditSessions,
    /// The `{mutation -> reloads}` dependency table.
    cascades: CascadeTable,
}

impl<A: RbacApi> Console<A> {
    /// Create a console over `api`, reporting through the tracing notifier.
    pub fn new(api: A) -> Self {
        Self::with_notifier(api, Arc::new(TracingNotifier))
    }

    /// Create a console with an explicit notifier.
    pub fn with_notifier(api: A, notifier: Arc<dyn Notify>) -> Self {
        Self {
            api: Arc::new(api),
            notifier,
            repository: EntityRepository::new(),
            filters: FilterEngine::new(),
            resolver: CandidateResolver::new(),
            sessions: EditSessions::new(),
            cascades: CascadeTable::new(),
        }
    }

    /// A handle to the backend (used by tests to reach the fake server).
    pub fn api(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Load all four collections. Called once at startup.
    pub async fn initialize(&mut self) -> Result<()> {
        for kind in EntityKind::ALL {
            self.reload(kind).await?;
        }
        Ok(())
    }

    /// Reload one collection and drop every candidate cache that reads
    /// from it. A failed reload keeps the stale collection and surfaces a
    /// collection-scoped error through the notifier.
    pub async fn reload(&mut self, kind: EntityKind) -> Result<()> {
        match self.repository.reload(self.api.as_ref(), kind).await {
            Ok(()) => {
                self.resolver.invalidate_collection(kind);
                Ok(())
            }
            Err(err) => {
                self.notifier.error(&err.to_string());
                Err(err)
            }
        }
    }

    async fn run_cascade(&mut self, trigger: CascadeTrigger) -> Result<()> {
        let kinds = self.cascades.reloads_for(trigger).to_vec();
        for kind in kinds {
            self.reload(kind).await?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Views
    // ─────────────────────────────────────────────────────────────────────────

    pub fn repository(&self) -> &EntityRepository {
        &self.repository
    }

    pub fn sessions(&self) -> &EditSessions {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut EditSessions {
        &mut self.sessions
    }

    /// Set the free-text query for one collection tab.
    pub fn set_query(&mut self, kind: EntityKind, text: impl Into<String>) {
        self.filters.set_query(kind, text);
    }

    pub fn query(&self, kind: EntityKind) -> &str {
        self.filters.query(kind)
    }

    /// Switch the active tab; all four queries are cleared.
    pub fn switch_tab(&mut self, kind: EntityKind) {
        self.filters.switch_tab(kind);
    }

    pub fn active_tab(&self) -> EntityKind {
        self.filters.active()
    }

    pub fn filtered_users(&self) -> Vec<&User> {
        self.filters.filtered_users(self.repository.users())
    }

    pub fn filtered_roles(&self) -> Vec<&Role> {
        self.filters.filtered_roles(self.repository.roles())
    }

    pub fn filtered_namespaces(&self) -> Vec<&Namespace> {
        self.filters.filtered_namespaces(self.repository.namespaces())
    }

    pub fn filtered_processes(&self) -> Vec<&Process> {
        self.filters.filtered_processes(self.repository.processes())
    }

    /// Roles assignable to `user`, filtered by `query`.
    pub fn role_candidates(&mut self, user: UserId, query: &str) -> Result<Vec<RoleRef>> {
        self.resolver.roles_for_user(&self.repository, user, query)
    }

    /// Permissions assignable to `role`, flattened across namespaces.
    pub fn permission_candidates(
        &mut self,
        role: RoleId,
        query: &str,
    ) -> Result<Vec<PermissionCandidate>> {
        self.resolver
            .permissions_for_role(&self.repository, role, query)
    }

    /// Namespaces assignable to `process`.
    pub fn namespace_candidates(
        &mut self,
        process: ProcessId,
        query: &str,
    ) -> Result<Vec<NamespaceRef>> {
        self.resolver
            .namespaces_for_process(&self.repository, process, query)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Assign a related entity to its owner.
    ///
    /// On success: the owner's candidate cache is invalidated, its pending
    /// selection and search text are cleared, the owner's edit session
    /// closes, and the cascade reloads run. On failure the session stays
    /// open for retry and nothing local changes.
    pub async fn assign(&mut self, assignment: Assignment) -> Result<()> {
        let (owner_label, related_label) = self.labels(&assignment);
        debug!(?assignment, "assign");

        let result = match assignment {
            Assignment::RoleToUser { user, role } => self.api.assign_role(user, role).await,
            Assignment::PermissionToRole { role, permission } => {
                self.api.assign_permission(role, permission).await
            }
            Assignment::NamespaceToProcess { process, namespace } => {
                self.api.assign_namespace(process, namespace).await
            }
        };
        if let Err(source) = result {
            let err = EngineError::Mutation {
                operation: format!("assign {related_label} to {owner_label}"),
                source,
            };
            self.notifier.error(&err.to_string());
            return Err(err);
        }

        self.settle_after_mutation(&assignment, true);
        self.notifier
            .success(&format!("Assigned {related_label} to {owner_label}"));
        self.run_cascade(CascadeTrigger::Mutated(assignment.relation()))
            .await
    }

    /// Human-readable summary of a removal, to be confirmed by the
    /// operator before calling [`Console::remove`].
    pub fn removal_summary(&self, assignment: &Assignment) -> String {
        let (owner_label, related_label) = self.labels(assignment);
        format!("Remove {related_label} from {owner_label}?")
    }

    /// Remove a related entity from its owner.
    ///
    /// Invalidates the same caches as [`Console::assign`] and runs the
    /// same cascade; it does not touch the edit session, which belongs to
    /// the assignment flow.
    pub async fn remove(&mut self, assignment: Assignment) -> Result<()> {
        let (owner_label, related_label) = self.labels(&assignment);
        debug!(?assignment, "remove");

        let result = match assignment {
            Assignment::RoleToUser { user, role } => self.api.remove_role(user, role).await,
            Assignment::PermissionToRole { role, permission } => {
                self.api.remove_permission(role, permission).await
            }
            Assignment::NamespaceToProcess { process, namespace } => {
                self.api.remove_namespace(process, namespace).await
            }
        };
        if let Err(source) = result {
            let err = EngineError::Mutation {
                operation: format!("remove {related_label} from {owner_label}"),
                source,
            };
            self.notifier.error(&err.to_string());
            return Err(err);
        }

        self.settle_after_mutation(&assignment, false);
        self.notifier
            .success(&format!("Removed {related_label} from {owner_label}"));
        self.run_cascade(CascadeTrigger::Mutated(assignment.relation()))
            .await
    }

    /// Post-success bookkeeping shared by assign and remove.
    fn settle_after_mutation(&mut self, assignment: &Assignment, close_session: bool) {
        self.resolver.invalidate_owner(assignment);
        match *assignment {
            Assignment::RoleToUser { user, .. } => {
                let session = &mut self.sessions.user_roles;
                session.clear_selection(user);
                session.clear_search(user);
                if close_session {
                    session.finish_edit_for(user);
                }
            }
            Assignment::PermissionToRole { role, .. } => {
                let session = &mut self.sessions.role_permissions;
                session.clear_selection(role);
                session.clear_search(role);
                if close_session {
                    session.finish_edit_for(role);
                }
            }
            Assignment::NamespaceToProcess { process, .. } => {
                let session = &mut self.sessions.process_namespaces;
                session.clear_selection(process);
                session.clear_search(process);
                if close_session {
                    session.finish_edit_for(process);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity Creation
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a user. An empty username or password fails validation
    /// synchronously — no network call is issued.
    pub async fn create_user(&mut self, new: NewUser) -> Result<User> {
        if let Err(invalid) = validate_new_user(&new) {
            let err = EngineError::from(invalid);
            self.notifier.error(&err.to_string());
            return Err(err);
        }
        match self.api.create_user(&new).await {
            Ok(user) => {
                self.notifier
                    .success(&format!("Created user '{}'", user.username));
                self.run_cascade(CascadeTrigger::Created(EntityKind::User))
                    .await?;
                Ok(user)
            }
            Err(source) => {
                // Server message passes through verbatim.
                self.notifier.error(&source.to_string());
                Err(EngineError::Mutation {
                    operation: format!("create user '{}'", new.username),
                    source,
                })
            }
        }
    }

    /// Create a role.
    pub async fn create_role(&mut self, name: &str) -> Result<Role> {
        let name = name.trim();
        if let Err(invalid) = validate_name(EntityKind::Role, name) {
            let err = EngineError::from(invalid);
            self.notifier.error(&err.to_string());
            return Err(err);
        }
        match self.api.create_role(name).await {
            Ok(role) => {
                self.notifier.success(&format!("Created role '{}'", role.name));
                self.run_cascade(CascadeTrigger::Created(EntityKind::Role))
                    .await?;
                Ok(role)
            }
            Err(source) => {
                self.notifier.error(&source.to_string());
                Err(EngineError::Mutation {
                    operation: format!("create role '{name}'"),
                    source,
                })
            }
        }
    }

    /// Create a namespace.
    pub async fn create_namespace(&mut self, name: &str) -> Result<Namespace> {
        let name = name.trim();
        if let Err(invalid) = validate_name(EntityKind::Namespace, name) {
            let err = EngineError::from(invalid);
            self.notifier.error(&err.to_string());
            return Err(err);
        }
        match self.api.create_namespace(name).await {
            Ok(namespace) => {
                self.notifier
                    .success(&format!("Created namespace '{}'", namespace.name));
                self.run_cascade(CascadeTrigger::Created(EntityKind::Namespace))
                    .await?;
                Ok(namespace)
            }
            Err(source) => {
                self.notifier.error(&source.to_string());
                Err(EngineError::Mutation {
                    operation: format!("create namespace '{name}'"),
                    source,
                })
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity Updates
    // ─────────────────────────────────────────────────────────────────────────

    /// Update a user's display name (the username is immutable).
    pub async fn rename_user(&mut self, id: UserId, display_name: &str) -> Result<()> {
        let display_name = display_name.trim();
        validate_name(EntityKind::User, display_name)?;
        let api = Arc::clone(&self.api);
        self.call_and_cascade(
            api.rename_user(id, display_name),
            format!("rename user {id}"),
            format!("Updated user {id}"),
            CascadeTrigger::Renamed(EntityKind::User),
        )
        .await
    }

    /// Rename a role. Users are reloaded too: their rows display role
    /// names.
    pub async fn rename_role(&mut self, id: RoleId, name: &str) -> Result<()> {
        let name = name.trim();
        validate_name(EntityKind::Role, name)?;
        let api = Arc::clone(&self.api);
        self.call_and_cascade(
            api.rename_role(id, name),
            format!("rename role {id}"),
            format!("Renamed role to '{name}'"),
            CascadeTrigger::Renamed(EntityKind::Role),
        )
        .await
    }

    /// Rename a namespace. Roles are reloaded too: their permission labels
    /// embed namespace names.
    pub async fn rename_namespace(&mut self, id: NamespaceId, name: &str) -> Result<()> {
        let name = name.trim();
        validate_name(EntityKind::Namespace, name)?;
        let api = Arc::clone(&self.api);
        self.call_and_cascade(
            api.rename_namespace(id, name),
            format!("rename namespace {id}"),
            format!("Renamed namespace to '{name}'"),
            CascadeTrigger::Renamed(EntityKind::Namespace),
        )
        .await
    }

    /// Rename a process, preserving its description.
    pub async fn rename_process(&mut self, id: ProcessId, name: &str) -> Result<()> {
        let name = name.trim();
        validate_name(EntityKind::Process, name)?;
        let description = self
            .repository
            .process(id)
            .ok_or(EngineError::UnknownOwner {
                kind: EntityKind::Process,
                id: id.raw(),
            })?
            .description
            .clone();
        let api = Arc::clone(&self.api);
        self.call_and_cascade(
            api.update_process(id, name, description.as_deref()),
            format!("rename process {id}"),
            format!("Renamed process to '{name}'"),
            CascadeTrigger::Renamed(EntityKind::Process),
        )
        .await
    }

    /// Set or clear a process's description, preserving its name.
    pub async fn set_description(
        &mut self,
        id: ProcessId,
        description: Option<String>,
    ) -> Result<()> {
        let name = self
            .repository
            .process(id)
            .ok_or(EngineError::UnknownOwner {
                kind: EntityKind::Process,
                id: id.raw(),
            })?
            .name
            .clone();
        let api = Arc::clone(&self.api);
        self.call_and_cascade(
            api.update_process(id, &name, description.as_deref()),
            format!("update process {id}"),
            format!("Updated process '{name}'"),
            CascadeTrigger::Renamed(EntityKind::Process),
        )
        .await
    }

    /// Toggle a user's enabled flag.
    ///
    /// The one optimistic mutation: on success the cached flag is flipped
    /// in place instead of reloading the collection.
    pub async fn set_enabled(&mut self, id: UserId, enabled: bool) -> Result<()> {
        if let Err(source) = self.api.set_user_enabled(id, enabled).await {
            let err = EngineError::Mutation {
                operation: format!("set enabled for user {id}"),
                source,
            };
            self.notifier.error(&err.to_string());
            return Err(err);
        }
        self.repository.apply_enabled(id, enabled);
        let verb = if enabled { "Enabled" } else { "Disabled" };
        self.notifier.success(&format!("{verb} user {id}"));
        Ok(())
    }

    /// Await a no-content mutation, then notify and run its cascade.
    async fn call_and_cascade(
        &mut self,
        call: impl std::future::Future<Output = opsdeck_rbac_api::Result<()>>,
        operation: String,
        success: String,
        trigger: CascadeTrigger,
    ) -> Result<()> {
        if let Err(source) = call.await {
            let err = EngineError::Mutation { operation, source };
            self.notifier.error(&err.to_string());
            return Err(err);
        }
        self.notifier.success(&success);
        self.run_cascade(trigger).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Labels
    // ─────────────────────────────────────────────────────────────────────────

    /// `(owner, related)` display labels for notifications and removal
    /// summaries, falling back to ids when an entity is not cached.
    fn labels(&self, assignment: &Assignment) -> (String, String) {
        match *assignment {
            Assignment::RoleToUser { user, role } => (
                self.repository
                    .user(user)
                    .map(|u| format!("user '{}'", u.username))
                    .unwrap_or_else(|| format!("user #{user}")),
                self.repository
                    .role(role)
                    .map(|r| format!("role '{}'", r.name))
                    .unwrap_or_else(|| format!("role #{role}")),
            ),
            Assignment::PermissionToRole { role, permission } => (
                self.repository
                    .role(role)
                    .map(|r| format!("role '{}'", r.name))
                    .unwrap_or_else(|| format!("role #{role}")),
                self.repository
                    .permission_label(permission)
                    .map(|label| format!("permission '{label}'"))
                    .unwrap_or_else(|| format!("permission #{permission}")),
            ),
            Assignment::NamespaceToProcess { process, namespace } => (
                self.repository
                    .process(process)
                    .map(|p| format!("process '{}'", p.name))
                    .unwrap_or_else(|| format!("process #{process}")),
                self.repository
                    .namespace(namespace)
                    .map(|n| format!("namespace '{}'", n.name))
                    .unwrap_or_else(|| format!("namespace #{namespace}")),
            ),
        }
    }
}
