use async_trait::async_trait;
use devreg::{
    ApiError, ApiResult, DesiredIdentity, DevRegError, DeviceId, DeviceIdentity, IdentityUpdate,
    LocalIdentityStore, NodeIdStore, RandomCredentials, Registrar, RegisterOptions,
    RegistrationOutcome, RegistrationRequest, RegistrationWorkflow, RenameRequest, Result,
    TelemetryFlush,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

type EventLog = Arc<Mutex<Vec<String>>>;

struct FakeRegistrar {
    responses: Mutex<VecDeque<ApiResult<DeviceId>>>,
    requests: Mutex<Vec<RegistrationRequest>>,
    renames: Mutex<Vec<RenameRequest>>,
    log: EventLog,
    identity_path: PathBuf,
    register_elsewhere: bool,
}

impl FakeRegistrar {
    fn new(log: EventLog, identity_path: &Path) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            renames: Mutex::new(Vec::new()),
            log,
            identity_path: identity_path.to_path_buf(),
            register_elsewhere: false,
        }
    }

    fn respond(self, responses: Vec<ApiResult<DeviceId>>) -> Self {
        *self.responses.lock().unwrap() = responses.into();
        self
    }

    fn requests(&self) -> Vec<RegistrationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn renames(&self) -> Vec<RenameRequest> {
        self.renames.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registrar for FakeRegistrar {
    async fn register(&self, request: &RegistrationRequest) -> ApiResult<DeviceId> {
        self.requests.lock().unwrap().push(request.clone());
        self.log.lock().unwrap().push(format!(
            "register identity_exists={}",
            self.identity_path.exists()
        ));
        if self.register_elsewhere {
            std::fs::write(&self.identity_path, identity_toml(99)).unwrap();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(DeviceId::new(42)))
    }

    async fn rename(&self, _current: &DeviceIdentity, update: &RenameRequest) -> ApiResult<()> {
        self.renames.lock().unwrap().push(update.clone());
        self.log.lock().unwrap().push("rename".to_string());
        Ok(())
    }

    fn server(&self) -> &str {
        "https://api.example.test"
    }
}

struct RecordingFlush {
    log: EventLog,
    identity_path: PathBuf,
}

#[async_trait]
impl TelemetryFlush for RecordingFlush {
    async fn flush(&self) -> Result<()> {
        self.log.lock().unwrap().push(format!(
            "flush identity_exists={}",
            self.identity_path.exists()
        ));
        Ok(())
    }
}

struct Harness {
    _dir: TempDir,
    node_id_path: PathBuf,
    identity_path: PathBuf,
    log: EventLog,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        Self {
            node_id_path: dir.path().join("minion_id"),
            identity_path: dir.path().join("device.toml"),
            log: Arc::new(Mutex::new(Vec::new())),
            _dir: dir,
        }
    }

    fn registrar(&self) -> FakeRegistrar {
        FakeRegistrar::new(self.log.clone(), &self.identity_path)
    }

    fn workflow(&self, registrar: Arc<FakeRegistrar>) -> RegistrationWorkflow {
        RegistrationWorkflow::new(
            registrar,
            NodeIdStore::new(&self.node_id_path),
            LocalIdentityStore::new(&self.identity_path),
        )
        .with_flush(Arc::new(RecordingFlush {
            log: self.log.clone(),
            identity_path: self.identity_path.clone(),
        }))
        .with_credentials(Arc::new(RandomCredentials::seeded(3)))
        .with_retry_wait(Duration::from_secs(5))
    }

    fn node_id(&self) -> Option<String> {
        std::fs::read_to_string(&self.node_id_path).ok()
    }

    async fn identity(&self) -> Option<DeviceIdentity> {
        LocalIdentityStore::new(&self.identity_path)
            .load()
            .await
            .unwrap()
    }

    fn events(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

fn identity_toml(id: u64) -> String {
    format!(
        "[device]\nid = {id}\nname = \"fox-lamp-otter\"\ngroup = \"g1\"\n\n[secrets]\npassword = \"secret123\"\n"
    )
}

fn desired() -> DesiredIdentity {
    DesiredIdentity {
        name: Some("fox-lamp-otter".into()),
        group: "g1".into(),
        password: Some("secret123".into()),
    }
}

fn options() -> RegisterOptions {
    RegisterOptions {
        node_id_prefix: "pi".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_first_registration_writes_node_id_and_identity() {
    let h = Harness::new();
    let registrar = Arc::new(h.registrar());
    let workflow = h.workflow(registrar.clone());

    let outcome = workflow.register(&desired(), &options()).await.unwrap();

    assert_eq!(
        outcome,
        RegistrationOutcome::Registered {
            device_id: DeviceId::new(42),
            name: "fox-lamp-otter".into(),
            group: "g1".into(),
            node_id_written: true,
        }
    );
    assert_eq!(registrar.requests().len(), 1);
    assert!(registrar.requests()[0].existing_id.is_unset());
    assert_eq!(h.node_id().as_deref(), Some("pi-42"));

    let identity = h.identity().await.unwrap();
    assert_eq!(identity.id, DeviceId::new(42));
    assert_eq!(identity.name, "fox-lamp-otter");
    assert_eq!(identity.group, "g1");
    assert_eq!(identity.secret, "secret123");
    assert_eq!(identity.server.as_deref(), Some("https://api.example.test"));
    assert!(identity.registered_at.is_some());
}

#[tokio::test]
async fn test_existing_node_id_is_reused_and_left_alone() {
    let h = Harness::new();
    std::fs::write(&h.node_id_path, "pi-test-42").unwrap();
    let registrar = Arc::new(h.registrar());
    let workflow = h.workflow(registrar.clone());

    let outcome = workflow.register(&desired(), &options()).await.unwrap();

    assert_eq!(registrar.requests()[0].existing_id, DeviceId::new(42));
    assert_eq!(outcome.device_id(), Some(DeviceId::new(42)));
    assert!(matches!(
        outcome,
        RegistrationOutcome::Registered {
            node_id_written: false,
            ..
        }
    ));
    assert_eq!(h.node_id().as_deref(), Some("pi-test-42"));
    assert_eq!(h.identity().await.unwrap().id, DeviceId::new(42));
}

#[tokio::test]
async fn test_unparseable_node_id_requests_new_id() {
    let h = Harness::new();
    std::fs::write(&h.node_id_path, "pi-notanumber").unwrap();
    let registrar = Arc::new(h.registrar().respond(vec![Ok(DeviceId::new(77))]));
    let workflow = h.workflow(registrar.clone());

    workflow.register(&desired(), &options()).await.unwrap();

    assert!(registrar.requests()[0].existing_id.is_unset());
    assert_eq!(h.node_id().as_deref(), Some("pi-77"));
}

#[tokio::test]
async fn test_already_registered_is_noop() {
    let h = Harness::new();
    std::fs::write(&h.identity_path, identity_toml(42)).unwrap();
    std::fs::write(&h.node_id_path, "pi-42").unwrap();
    let registrar = Arc::new(h.registrar());
    let workflow = h.workflow(registrar.clone());

    let outcome = workflow.register(&desired(), &options()).await.unwrap();

    assert_eq!(outcome, RegistrationOutcome::AlreadyRegistered);
    assert!(registrar.requests().is_empty());
    assert!(h.events().is_empty());
    assert_eq!(h.node_id().as_deref(), Some("pi-42"));
    assert_eq!(std::fs::read_to_string(&h.identity_path).unwrap(), identity_toml(42));
}

#[tokio::test(start_paused = true)]
async fn test_retry_until_success() {
    let h = Harness::new();
    let registrar = Arc::new(h.registrar().respond(vec![
        Err(ApiError::Connection("refused".into())),
        Err(ApiError::Timeout(30)),
        Ok(DeviceId::new(42)),
    ]));
    let workflow = h.workflow(registrar.clone());

    let start = tokio::time::Instant::now();
    let outcome = workflow
        .register_until_success(&desired(), &options(), std::future::pending())
        .await
        .unwrap();

    assert_eq!(registrar.requests().len(), 3);
    assert!(start.elapsed() >= Duration::from_secs(10));
    assert_eq!(outcome.device_id(), Some(DeviceId::new(42)));
    assert!(workflow.is_registered().await);
    assert_eq!(h.node_id().as_deref(), Some("pi-42"));
}

#[tokio::test(start_paused = true)]
async fn test_retry_stops_on_shutdown_between_attempts() {
    let h = Harness::new();
    let registrar = Arc::new(h.registrar().respond(vec![
        Err(ApiError::Connection("refused".into())),
        Err(ApiError::Connection("refused".into())),
    ]));
    let workflow = h
        .workflow(registrar.clone())
        .with_retry_wait(Duration::from_secs(60));

    let err = workflow
        .register_until_success(
            &desired(),
            &options(),
            tokio::time::sleep(Duration::from_secs(1)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DevRegError::Cancelled));
    assert_eq!(registrar.requests().len(), 1);
    assert!(!workflow.is_registered().await);
}

#[tokio::test(start_paused = true)]
async fn test_retry_stops_when_registered_elsewhere() {
    let h = Harness::new();
    let mut registrar = h
        .registrar()
        .respond(vec![Err(ApiError::Connection("refused".into()))]);
    registrar.register_elsewhere = true;
    let registrar = Arc::new(registrar);
    let workflow = h.workflow(registrar.clone());

    let outcome = workflow
        .register_until_success(&desired(), &options(), std::future::pending())
        .await
        .unwrap();

    assert_eq!(outcome, RegistrationOutcome::AlreadyRegistered);
    assert_eq!(registrar.requests().len(), 1);
}

#[tokio::test]
async fn test_remove_device_config_flushes_then_deletes_before_registering() {
    let h = Harness::new();
    std::fs::write(&h.identity_path, identity_toml(42)).unwrap();
    std::fs::write(&h.node_id_path, "pi-42").unwrap();
    let registrar = Arc::new(h.registrar().respond(vec![Ok(DeviceId::new(43))]));
    let workflow = h.workflow(registrar.clone());

    let options = RegisterOptions {
        ignore_node_id: true,
        remove_device_config: true,
        node_id_prefix: "pi".into(),
    };
    let outcome = workflow.register(&desired(), &options).await.unwrap();

    assert_eq!(
        h.events(),
        vec![
            "flush identity_exists=true".to_string(),
            "register identity_exists=false".to_string(),
        ]
    );
    assert_eq!(outcome.device_id(), Some(DeviceId::new(43)));
    assert_eq!(h.identity().await.unwrap().id, DeviceId::new(43));
    // Ignored, so neither read nor rewritten.
    assert!(registrar.requests()[0].existing_id.is_unset());
    assert_eq!(h.node_id().as_deref(), Some("pi-42"));
}

#[tokio::test]
async fn test_failed_registration_persists_nothing() {
    let h = Harness::new();
    let registrar = Arc::new(h.registrar().respond(vec![Err(ApiError::Rejected {
        message: "group does not exist".into(),
    })]));
    let workflow = h.workflow(registrar.clone());

    let err = workflow.register(&desired(), &options()).await.unwrap_err();

    assert!(matches!(
        err,
        DevRegError::Registration(ApiError::Rejected { .. })
    ));
    assert!(h.node_id().is_none());
    assert!(h.identity().await.is_none());
}

#[tokio::test]
async fn test_reassigned_id_is_persisted_and_node_id_kept() {
    let h = Harness::new();
    std::fs::write(&h.node_id_path, "pi-42").unwrap();
    let registrar = Arc::new(h.registrar().respond(vec![Ok(DeviceId::new(43))]));
    let workflow = h.workflow(registrar.clone());

    let outcome = workflow.register(&desired(), &options()).await.unwrap();

    assert_eq!(registrar.requests()[0].existing_id, DeviceId::new(42));
    assert_eq!(
        outcome,
        RegistrationOutcome::Registered {
            device_id: DeviceId::new(43),
            name: "fox-lamp-otter".into(),
            group: "g1".into(),
            node_id_written: false,
        }
    );
    assert_eq!(h.identity().await.unwrap().id, DeviceId::new(43));
    assert_eq!(h.node_id().as_deref(), Some("pi-42"));
}

#[tokio::test(start_paused = true)]
async fn test_reassigned_id_ends_retry_loop() {
    let h = Harness::new();
    std::fs::write(&h.node_id_path, "pi-42").unwrap();
    let registrar = Arc::new(h.registrar().respond(vec![
        Ok(DeviceId::new(43)),
        Ok(DeviceId::new(44)),
        Ok(DeviceId::new(45)),
    ]));
    let workflow = h.workflow(registrar.clone());

    let outcome = workflow
        .register_until_success(&desired(), &options(), std::future::pending())
        .await
        .unwrap();

    assert_eq!(registrar.requests().len(), 1);
    assert_eq!(outcome.device_id(), Some(DeviceId::new(43)));
    assert_eq!(h.identity().await.unwrap().id, DeviceId::new(43));

    // A later run sees the saved identity and leaves the backend alone.
    let again = workflow.register(&desired(), &options()).await.unwrap();
    assert_eq!(again, RegistrationOutcome::AlreadyRegistered);
    assert_eq!(registrar.requests().len(), 1);
}

#[tokio::test]
async fn test_defaults_are_fresh_per_attempt() {
    let h = Harness::new();
    let registrar = Arc::new(h.registrar().respond(vec![
        Err(ApiError::Rejected {
            message: "devicename in use".into(),
        }),
        Ok(DeviceId::new(42)),
    ]));
    let workflow = h.workflow(registrar.clone());
    let desired = DesiredIdentity {
        name: None,
        group: "g1".into(),
        password: None,
    };

    assert!(workflow.register(&desired, &options()).await.is_err());
    workflow.register(&desired, &options()).await.unwrap();

    let requests = registrar.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].name.split('-').count(), 3);
    assert_ne!(requests[0].password, requests[1].password);

    let identity = h.identity().await.unwrap();
    assert_eq!(identity.name, requests[1].name);
    assert_eq!(identity.secret, requests[1].password);
}

#[tokio::test]
async fn test_ignore_node_id_leaves_record_untouched() {
    let h = Harness::new();
    std::fs::write(&h.node_id_path, "pi-42").unwrap();
    let registrar = Arc::new(h.registrar().respond(vec![Ok(DeviceId::new(50))]));
    let workflow = h.workflow(registrar.clone());

    let options = RegisterOptions {
        ignore_node_id: true,
        ..options()
    };
    workflow.register(&desired(), &options).await.unwrap();

    assert!(registrar.requests()[0].existing_id.is_unset());
    assert_eq!(h.node_id().as_deref(), Some("pi-42"));
    assert_eq!(h.identity().await.unwrap().id, DeviceId::new(50));
}

#[tokio::test]
async fn test_reregister_requires_identity() {
    let h = Harness::new();
    let registrar = Arc::new(h.registrar());
    let workflow = h.workflow(registrar.clone());

    let update = IdentityUpdate {
        name: Some("new-name".into()),
        ..Default::default()
    };
    let err = workflow.reregister(&update).await.unwrap_err();

    assert!(matches!(err, DevRegError::NotRegistered));
    assert!(registrar.renames().is_empty());
}

#[tokio::test]
async fn test_reregister_needs_a_change() {
    let h = Harness::new();
    std::fs::write(&h.identity_path, identity_toml(42)).unwrap();
    let workflow = h.workflow(Arc::new(h.registrar()));

    let err = workflow
        .reregister(&IdentityUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DevRegError::NothingToChange));
}

#[tokio::test]
async fn test_reregister_keeps_current_fields_and_id() {
    let h = Harness::new();
    std::fs::write(&h.identity_path, identity_toml(42)).unwrap();
    std::fs::write(&h.node_id_path, "pi-42").unwrap();
    let registrar = Arc::new(h.registrar());
    let workflow = h.workflow(registrar.clone());

    let update = IdentityUpdate {
        group: Some("g2".into()),
        ..Default::default()
    };
    let renamed = workflow.reregister(&update).await.unwrap();

    assert_eq!(
        h.events(),
        vec!["flush identity_exists=true".to_string(), "rename".to_string()]
    );
    let rename = &registrar.renames()[0];
    assert_eq!(rename.name, "fox-lamp-otter");
    assert_eq!(rename.group, "g2");
    assert_eq!(rename.password, "secret123");

    assert_eq!(renamed.id, DeviceId::new(42));
    assert_eq!(h.identity().await.unwrap(), renamed);
    assert_eq!(h.identity().await.unwrap().group, "g2");
    assert_eq!(h.node_id().as_deref(), Some("pi-42"));
    assert!(registrar.requests().is_empty());
}
