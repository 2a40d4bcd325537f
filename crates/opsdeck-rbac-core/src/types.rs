//! Strong type definitions for the RBAC console.
//!
//! All identifiers are newtypes over the server-assigned integer id to
//! prevent cross-entity misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw server-assigned id.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw id.
            pub const fn raw(self) -> i64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a user account.
    UserId
);
entity_id!(
    /// Identifier of a role.
    RoleId
);
entity_id!(
    /// Identifier of a namespace.
    NamespaceId
);
entity_id!(
    /// Identifier of a process definition.
    ProcessId
);
entity_id!(
    /// Identifier of a permission.
    PermissionId
);

/// The four entity collections managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Role,
    Namespace,
    Process,
}

impl EntityKind {
    /// All collection kinds, in tab order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::User,
        EntityKind::Role,
        EntityKind::Namespace,
        EntityKind::Process,
    ];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Role => "role",
            EntityKind::Namespace => "namespace",
            EntityKind::Process => "process",
        };
        f.write_str(name)
    }
}

/// Shallow reference to a role (id + denormalized name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: RoleId,
    pub name: String,
}

/// Shallow reference to a namespace (id + denormalized name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRef {
    pub id: NamespaceId,
    pub name: String,
}

/// Shallow reference to a process (id + denormalized name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRef {
    pub id: ProcessId,
    pub name: String,
}

/// A permission as defined inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDef {
    pub id: PermissionId,
    /// Type label, e.g. "visualizar" or "ejecutar".
    pub permission_type: String,
}

/// A permission together with the namespaces it is scoped to.
///
/// Permissions are never created directly by this engine; they are
/// enumerated from namespaces and assigned to roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub permission_type: String,
    pub namespaces: Vec<NamespaceRef>,
}

/// An operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Immutable once created.
    pub username: String,
    pub display_name: Option<String>,
    pub enabled: bool,
    pub roles: Vec<RoleRef>,
}

impl User {
    /// The primary display label used by search and filtering.
    pub fn label(&self) -> &str {
        &self.username
    }
}

/// A role with its assigned permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn label(&self) -> &str {
        &self.name
    }
}

/// A namespace: a scope that owns permissions and groups processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: NamespaceId,
    pub name: String,
    pub processes: Vec<ProcessRef>,
    pub permissions: Vec<PermissionDef>,
}

impl Namespace {
    pub fn label(&self) -> &str {
        &self.name
    }
}

/// A workflow process definition.
///
/// A process belongs to at most one namespace at a time; assigning it to a
/// new namespace replaces any previous assignment server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    pub description: Option<String>,
    pub namespace: Option<NamespaceRef>,
}

impl Process {
    pub fn label(&self) -> &str {
        &self.name
    }
}

/// Payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// The three many-to-many relations managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    UserRole,
    RolePermission,
    ProcessNamespace,
}

impl Relation {
    /// The collection that owns the relation edit (the table the inline
    /// assignment row appears in).
    pub fn owner_kind(self) -> EntityKind {
        match self {
            Relation::UserRole => EntityKind::User,
            Relation::RolePermission => EntityKind::Role,
            Relation::ProcessNamespace => EntityKind::Process,
        }
    }
}

/// A single relationship edit, resolved to typed ids at the boundary.
///
/// The remote API accepts several input shapes for relationship mutations;
/// callers resolve whatever they hold to one of these variants once, and
/// the rest of the engine never re-branches on input shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    RoleToUser { user: UserId, role: RoleId },
    PermissionToRole { role: RoleId, permission: PermissionId },
    NamespaceToProcess { process: ProcessId, namespace: NamespaceId },
}

impl Assignment {
    pub fn relation(&self) -> Relation {
        match self {
            Assignment::RoleToUser { .. } => Relation::UserRole,
            Assignment::PermissionToRole { .. } => Relation::RolePermission,
            Assignment::NamespaceToProcess { .. } => Relation::ProcessNamespace,
        }
    }

    pub fn owner_kind(&self) -> EntityKind {
        self.relation().owner_kind()
    }
}
