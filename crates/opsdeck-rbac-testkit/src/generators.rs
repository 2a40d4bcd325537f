//! Proptest generators for property-based testing.

use proptest::prelude::*;

use opsdeck_rbac_core::{
    EntityKind, Namespace, NamespaceId, NewUser, PermissionDef, PermissionId, Role, RoleId, User,
    UserId,
};

/// Generate an entity name: non-empty, no surrounding whitespace.
pub fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,23}"
}

/// Generate free-form query text, including empty and whitespace.
pub fn query() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9]{0,12}"
}

/// Generate one of the four entity kinds.
pub fn entity_kind() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ALL.to_vec())
}

/// Generate a creation payload with a non-empty username and password.
pub fn new_user() -> impl Strategy<Value = NewUser> {
    (name(), "[!-~]{1,16}", prop::option::of(name())).prop_map(
        |(username, password, display_name)| NewUser {
            username,
            password,
            display_name,
        },
    )
}

/// Generate a user row with no roles.
pub fn user() -> impl Strategy<Value = User> {
    (1i64..10_000, name(), any::<bool>()).prop_map(|(id, username, enabled)| User {
        id: UserId::new(id),
        username,
        display_name: None,
        enabled,
        roles: Vec::new(),
    })
}

/// Generate a role row with no permission grants.
pub fn role() -> impl Strategy<Value = Role> {
    (1i64..10_000, name()).prop_map(|(id, name)| Role {
        id: RoleId::new(id),
        name,
        permissions: Vec::new(),
    })
}

/// Generate a namespace with up to four permission definitions.
pub fn namespace() -> impl Strategy<Value = Namespace> {
    (
        1i64..10_000,
        name(),
        prop::collection::vec((10_000i64..20_000, name()), 0..4),
    )
        .prop_map(|(id, name, defs)| Namespace {
            id: NamespaceId::new(id),
            name,
            processes: Vec::new(),
            permissions: defs
                .into_iter()
                .map(|(id, permission_type)| PermissionDef {
                    id: PermissionId::new(id),
                    permission_type,
                })
                .collect(),
        })
}
