//! Scenario tests: operator-visible behavior of the console, asserted
//! through the recording notifier and the backend call log.

use opsdeck_rbac::{ApiError, Assignment, EntityKind, NewUser};
use opsdeck_rbac_testkit::ConsoleFixture;

#[tokio::test]
async fn test_assign_role_notifies_with_labels() {
    let mut fx = ConsoleFixture::new().await;
    fx.console
        .assign(Assignment::RoleToUser {
            user: ConsoleFixture::FSCHILDER,
            role: ConsoleFixture::ADMINISTRADOR,
        })
        .await
        .unwrap();

    assert_eq!(
        fx.notifier.successes(),
        vec!["Assigned role 'administrador' to user 'fschilder'"]
    );
}

#[tokio::test]
async fn test_assign_role_cascade_reloads_users_only() {
    let mut fx = ConsoleFixture::new().await;
    fx.console
        .assign(Assignment::RoleToUser {
            user: ConsoleFixture::FSCHILDER,
            role: ConsoleFixture::ADMINISTRADOR,
        })
        .await
        .unwrap();

    assert_eq!(fx.console.api().calls(), vec!["assign_role", "list_users"]);
}

#[tokio::test]
async fn test_assign_namespace_cascade_reloads_both_sides() {
    let mut fx = ConsoleFixture::new().await;
    fx.console
        .assign(Assignment::NamespaceToProcess {
            process: ConsoleFixture::CAMPAIGNS,
            namespace: ConsoleFixture::MARKETING,
        })
        .await
        .unwrap();

    assert_eq!(
        fx.console.api().calls(),
        vec!["assign_namespace", "list_processes", "list_namespaces"]
    );
}

#[tokio::test]
async fn test_duplicate_username_message_passes_through_verbatim() {
    let mut fx = ConsoleFixture::new().await;
    let _ = fx
        .console
        .create_user(NewUser {
            username: "fschilder".into(),
            password: "secret".into(),
            display_name: None,
        })
        .await;

    assert_eq!(
        fx.notifier.errors(),
        vec!["username 'fschilder' is already taken"]
    );
}

#[tokio::test]
async fn test_empty_username_fails_before_the_network() {
    let mut fx = ConsoleFixture::new().await;
    let _ = fx
        .console
        .create_user(NewUser {
            username: "   ".into(),
            password: "secret".into(),
            display_name: None,
        })
        .await;

    assert!(fx.console.api().calls().is_empty());
    assert_eq!(fx.notifier.errors().len(), 1);
    assert!(fx.notifier.successes().is_empty());
}

#[tokio::test]
async fn test_permission_candidates_filter_by_label() {
    let mut fx = ConsoleFixture::new().await;

    let all = fx
        .console
        .permission_candidates(ConsoleFixture::ADMINISTRADOR, "")
        .unwrap();
    assert_eq!(all.len(), 3);

    let visu = fx
        .console
        .permission_candidates(ConsoleFixture::ADMINISTRADOR, "visu")
        .unwrap();
    assert_eq!(visu.len(), 1);
    assert_eq!(visu[0].label(), "marketing:visualizar");

    // The namespace name participates in the match.
    let fin = fx
        .console
        .permission_candidates(ConsoleFixture::ADMINISTRADOR, "finanzas")
        .unwrap();
    assert_eq!(fin.len(), 1);
    assert_eq!(fin[0].label(), "finanzas:editar_parametros");
}

#[tokio::test]
async fn test_removal_summary_names_the_permission() {
    let mut fx = ConsoleFixture::new().await;
    let assignment = Assignment::PermissionToRole {
        role: ConsoleFixture::ADMINISTRADOR,
        permission: ConsoleFixture::VISUALIZAR,
    };
    fx.console.assign(assignment).await.unwrap();

    assert_eq!(
        fx.console.removal_summary(&assignment),
        "Remove permission 'marketing:visualizar' from role 'administrador'?"
    );
}

#[tokio::test]
async fn test_failed_reload_reports_the_collection() {
    let mut fx = ConsoleFixture::new().await;
    fx.console
        .api()
        .inject_failure(ApiError::Transport("connection refused".into()));

    let _ = fx.console.reload(EntityKind::Role).await;

    assert_eq!(
        fx.notifier.errors(),
        vec!["failed to load role collection: transport error: connection refused"]
    );
    // The stale collection is still served.
    assert_eq!(fx.console.repository().roles().len(), 2);
}

#[tokio::test]
async fn test_failed_mutation_reports_the_operation() {
    let mut fx = ConsoleFixture::new().await;
    fx.console
        .api()
        .inject_failure(ApiError::Server("forbidden".into()));

    let _ = fx
        .console
        .assign(Assignment::RoleToUser {
            user: ConsoleFixture::NTRUJILLO,
            role: ConsoleFixture::OPERADOR,
        })
        .await;

    assert_eq!(
        fx.notifier.errors(),
        vec!["assign role 'operador' to user 'ntrujillo' failed: forbidden"]
    );
    // No reload happened after the failure.
    assert_eq!(fx.console.api().calls(), vec!["assign_role"]);
}

#[tokio::test]
async fn test_role_labels_follow_namespace_rename() {
    let mut fx = ConsoleFixture::new().await;
    fx.console
        .assign(Assignment::PermissionToRole {
            role: ConsoleFixture::OPERADOR,
            permission: ConsoleFixture::EJECUTAR,
        })
        .await
        .unwrap();
    assert_eq!(
        fx.console.repository().role_label_line(ConsoleFixture::OPERADOR),
        "marketing:ejecutar"
    );

    fx.console
        .rename_namespace(ConsoleFixture::MARKETING, "growth")
        .await
        .unwrap();

    assert_eq!(
        fx.console.repository().role_label_line(ConsoleFixture::OPERADOR),
        "growth:ejecutar"
    );
}

mod properties {
    use opsdeck_rbac_core::{validate_name, validate_new_user, EntityKind};
    use opsdeck_rbac_state::FilterEngine;
    use opsdeck_rbac_testkit::generators;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn generated_names_always_validate(name in generators::name(), kind in generators::entity_kind()) {
            prop_assert!(validate_name(kind, &name).is_ok());
        }

        #[test]
        fn generated_new_users_always_validate(new in generators::new_user()) {
            prop_assert!(validate_new_user(&new).is_ok());
        }

        #[test]
        fn switch_tab_clears_every_query(
            kind in generators::entity_kind(),
            target in generators::entity_kind(),
            text in generators::query(),
        ) {
            let mut filters = FilterEngine::new();
            filters.set_query(kind, text);
            filters.switch_tab(target);
            for k in EntityKind::ALL {
                prop_assert_eq!(filters.query(k), "");
            }
            prop_assert_eq!(filters.active(), target);
        }
    }
}
