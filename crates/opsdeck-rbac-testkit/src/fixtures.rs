//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a pre-seeded console over the
//! in-memory backend, plus a notifier that records every message.

use std::sync::{Arc, Mutex};

use opsdeck_rbac::{Console, MemoryApi};
use opsdeck_rbac_core::{
    Namespace, NamespaceId, PermissionDef, PermissionId, Process, ProcessId, Role, RoleId, User,
    UserId,
};
use opsdeck_rbac_state::Notify;

/// A notifier that records every message for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(bool, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Success messages, in emission order.
    pub fn successes(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(ok, _)| *ok)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    /// Error messages, in emission order.
    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(ok, _)| !*ok)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Notify for RecordingNotifier {
    fn success(&self, message: &str) {
        self.events.lock().unwrap().push((true, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.events.lock().unwrap().push((false, message.to_string()));
    }
}

/// A console over a seeded [`MemoryApi`], with a recording notifier.
///
/// The seed mirrors a small installation: two users, two roles, two
/// namespaces with permissions, and two processes not yet placed in a
/// namespace. Relationships are made through the console under test.
pub struct ConsoleFixture {
    pub console: Console<MemoryApi>,
    pub notifier: Arc<RecordingNotifier>,
}

impl ConsoleFixture {
    pub const FSCHILDER: UserId = UserId::new(1);
    pub const NTRUJILLO: UserId = UserId::new(2);
    pub const ADMINISTRADOR: RoleId = RoleId::new(3);
    pub const OPERADOR: RoleId = RoleId::new(4);
    pub const MARKETING: NamespaceId = NamespaceId::new(10);
    pub const FINANZAS: NamespaceId = NamespaceId::new(11);
    pub const VISUALIZAR: PermissionId = PermissionId::new(100);
    pub const EJECUTAR: PermissionId = PermissionId::new(101);
    pub const EDITAR_PARAMETROS: PermissionId = PermissionId::new(102);
    pub const CAMPAIGNS: ProcessId = ProcessId::new(20);
    pub const INVOICING: ProcessId = ProcessId::new(21);

    /// Build the fixture and load all collections.
    pub async fn new() -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let mut console =
            Console::with_notifier(seeded_api(), Arc::clone(&notifier) as Arc<dyn Notify>);
        console
            .initialize()
            .await
            .expect("seeded backend never fails to load");
        console.api().clear_calls();
        notifier.clear();
        Self { console, notifier }
    }
}

fn seeded_api() -> MemoryApi {
    let api = MemoryApi::new();
    api.seed_user(User {
        id: ConsoleFixture::FSCHILDER,
        username: "fschilder".into(),
        display_name: Some("F. Schilder".into()),
        enabled: true,
        roles: Vec::new(),
    });
    api.seed_user(User {
        id: ConsoleFixture::NTRUJILLO,
        username: "ntrujillo".into(),
        display_name: None,
        enabled: true,
        roles: Vec::new(),
    });
    api.seed_role(Role {
        id: ConsoleFixture::ADMINISTRADOR,
        name: "administrador".into(),
        permissions: Vec::new(),
    });
    api.seed_role(Role {
        id: ConsoleFixture::OPERADOR,
        name: "operador".into(),
        permissions: Vec::new(),
    });
    api.seed_namespace(Namespace {
        id: ConsoleFixture::MARKETING,
        name: "marketing".into(),
        processes: Vec::new(),
        permissions: vec![
            PermissionDef {
                id: ConsoleFixture::VISUALIZAR,
                permission_type: "visualizar".into(),
            },
            PermissionDef {
                id: ConsoleFixture::EJECUTAR,
                permission_type: "ejecutar".into(),
            },
        ],
    });
    api.seed_namespace(Namespace {
        id: ConsoleFixture::FINANZAS,
        name: "finanzas".into(),
        processes: Vec::new(),
        permissions: vec![PermissionDef {
            id: ConsoleFixture::EDITAR_PARAMETROS,
            permission_type: "editar_parametros".into(),
        }],
    });
    api.seed_process(Process {
        id: ConsoleFixture::CAMPAIGNS,
        name: "campaigns".into(),
        description: Some("outbound campaigns".into()),
        namespace: None,
    });
    api.seed_process(Process {
        id: ConsoleFixture::INVOICING,
        name: "invoicing".into(),
        description: None,
        namespace: None,
    });
    api
}
