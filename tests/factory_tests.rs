// Adapter factory integration tests
//
// External backends are served by a recording InstanceBuilder so that the
// shaping of each kind's configuration can be inspected.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::any::Any;
use std::sync::{Arc, Mutex};
use storage_factory::storage::factory::{AZURE_CONTAINER, RACKSPACE_IDENTITY_ENDPOINT};
use storage_factory::storage::{MemoryBackend, NullBackend, ReplicateBackend};
use storage_factory::{
    AdapterFactory, AvailabilityChecker, Backend, BackendKind, ClientHandle, ClientKind,
    ComponentSet, Config, ConstructorTable, FactoryError, InstanceBuilder, ObjectMeta,
    StorageBackend,
};

/// Backend standing in for an external implementation
struct FakeBackend {
    kind: BackendKind,
    config: Config,
}

#[async_trait]
impl StorageBackend for FakeBackend {
    async fn read(&self, path: &str) -> Result<Bytes> {
        bail!("fake backend has no object {}", path)
    }

    async fn write(&self, _path: &str, _data: Bytes) -> Result<()> {
        Ok(())
    }

    async fn list(&self, _prefix: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    async fn metadata(&self, _path: &str) -> Result<Option<ObjectMeta>> {
        Ok(None)
    }

    fn backend_type(&self) -> &str {
        self.kind.as_str()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Client(ClientKind, Config),
    Backend(BackendKind, Config),
    Grid(String),
}

#[derive(Default)]
struct RecordingBuilder {
    calls: Mutex<Vec<Call>>,
    fail_client: Option<ClientKind>,
}

impl RecordingBuilder {
    fn failing_on(kind: ClientKind) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_client: Some(kind),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl InstanceBuilder for RecordingBuilder {
    fn build_client(&self, kind: ClientKind, config: &Config) -> Result<ClientHandle> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Client(kind, config.clone()));
        if self.fail_client == Some(kind) {
            return Err(anyhow!("{} client unreachable", kind));
        }
        Ok(ClientHandle::new(kind, kind.as_str().to_string()))
    }

    fn build_backend(&self, kind: BackendKind, config: &Config) -> Result<Backend> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Backend(kind, config.clone()));
        Ok(Arc::new(FakeBackend {
            kind,
            config: config.clone(),
        }))
    }

    fn open_grid(&self, db_name: &str) -> Result<ClientHandle> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Grid(db_name.to_string()));
        Ok(ClientHandle::new(ClientKind::GridFs, db_name.to_string()))
    }
}

fn factory_with(
    builder: Arc<RecordingBuilder>,
    checker: impl AvailabilityChecker + 'static,
) -> AdapterFactory {
    AdapterFactory::new(builder, Arc::new(checker))
}

fn everything_available() -> (Arc<RecordingBuilder>, AdapterFactory) {
    let builder = Arc::new(RecordingBuilder::default());
    let factory = factory_with(builder.clone(), ComponentSet::all());
    (builder, factory)
}

fn fake_config(backend: &Backend) -> &Config {
    &backend
        .as_any()
        .downcast_ref::<FakeBackend>()
        .expect("external backend")
        .config
}

fn client_name(config: &Config, key: &str) -> String {
    config
        .get_handle(key)
        .and_then(|h| h.downcast_ref::<String>())
        .cloned()
        .unwrap_or_default()
}

#[test]
fn test_missing_adapter_defaults_to_local() {
    let factory = AdapterFactory::builtin();
    let implicit = factory.create(Config::new()).unwrap();
    let explicit = factory.create(Config::for_adapter("local")).unwrap();

    assert_eq!(implicit.backend_type(), "local");
    assert_eq!(explicit.backend_type(), "local");
}

#[test]
fn test_unknown_adapter() {
    let (_builder, factory) = everything_available();
    match factory.create(Config::for_adapter("unknown-xyz")) {
        Err(FactoryError::AdapterNotSupported(name)) => assert_eq!(name, "unknown-xyz"),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("unknown adapter built"),
    }
}

#[test]
fn test_package_required_names_component() {
    let builder = Arc::new(RecordingBuilder::default());
    let factory = factory_with(builder.clone(), |_: &str| false);

    match factory.create(Config::for_adapter("s3")) {
        Err(FactoryError::PackageRequired { adapter, component }) => {
            assert_eq!(adapter, "s3");
            assert_eq!(component, "s3-adapter");
        }
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("s3 built without its component"),
    }

    // no client was opened before the gate failed
    assert!(builder.calls().is_empty());
}

#[test]
fn test_ungated_kinds_ignore_checker() {
    let builder = Arc::new(RecordingBuilder::default());
    let factory = factory_with(builder.clone(), |_: &str| false);

    assert_eq!(factory.create(Config::for_adapter("null")).unwrap().backend_type(), "null");
    assert_eq!(factory.create(Config::for_adapter("local")).unwrap().backend_type(), "local");
    assert_eq!(factory.create(Config::for_adapter("ftp")).unwrap().backend_type(), "ftp");

    assert!(matches!(
        factory.create(Config::for_adapter("sftp")),
        Err(FactoryError::PackageRequired { .. })
    ));
}

#[test]
fn test_errors_are_stable_across_calls() {
    let factory = factory_with(Arc::new(RecordingBuilder::default()), ComponentSet::new());
    let config = Config::for_adapter("zip").with("path", "/tmp/archive.zip");

    let describe = |result: storage_factory::Result<Backend>| match result {
        Err(FactoryError::PackageRequired { adapter, component }) => (adapter, component),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("zip built without its component"),
    };

    let first = describe(factory.create(config.clone()));
    let second = describe(factory.create(config));
    assert_eq!(first, second);
    assert_eq!(first, ("zip".to_string(), "zip-adapter".to_string()));
}

#[test]
fn test_replicate_of_two_null_backends() {
    let factory = AdapterFactory::builtin();
    let config = Config::for_adapter("replicate")
        .with("source", Config::for_adapter("null"))
        .with("replica", Config::for_adapter("null"));

    let backend = factory.create(config).unwrap();
    assert_eq!(backend.backend_type(), "replicate");

    let replicate = backend.as_any().downcast_ref::<ReplicateBackend>().unwrap();
    assert!(replicate.source().as_any().is::<NullBackend>());
    assert!(replicate.replica().as_any().is::<NullBackend>());
    assert!(!Arc::ptr_eq(replicate.source(), replicate.replica()));
}

#[test]
fn test_replicate_requires_its_own_component() {
    let builder = Arc::new(RecordingBuilder::default());
    let checker = ComponentSet::new().with("zip-adapter");
    let factory = factory_with(builder.clone(), checker);
    let config = Config::for_adapter("replicate")
        .with("source", Config::for_adapter("zip").with("path", "/tmp/a.zip"))
        .with("replica", Config::for_adapter("zip").with("path", "/tmp/b.zip"));

    match factory.create(config) {
        Err(FactoryError::PackageRequired { adapter, component }) => {
            assert_eq!(adapter, "replicate");
            assert_eq!(component, "replicate-adapter");
        }
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("replicate built without its component"),
    }

    // Neither child reached the builder
    assert!(builder.calls().is_empty());
}

#[test]
fn test_replicate_propagates_child_errors() {
    let factory = AdapterFactory::builtin();
    let config = Config::for_adapter("replicate")
        .with("source", Config::for_adapter("null"))
        .with("replica", Config::for_adapter("webdav"));

    assert!(matches!(
        factory.create(config),
        Err(FactoryError::PackageRequired { adapter, .. }) if adapter == "webdav"
    ));
}

#[test]
fn test_nested_replicate() {
    let factory = AdapterFactory::builtin();
    let inner = Config::for_adapter("replicate")
        .with("source", Config::for_adapter("memory"))
        .with("replica", Config::for_adapter("null"));
    let outer = Config::for_adapter("replicate")
        .with("source", inner)
        .with("replica", Config::for_adapter("memory"));

    let backend = factory.create(outer).unwrap();
    let replicate = backend.as_any().downcast_ref::<ReplicateBackend>().unwrap();
    assert_eq!(replicate.source().backend_type(), "replicate");
    assert!(replicate.replica().as_any().is::<MemoryBackend>());
}

#[test]
fn test_phpcr_is_never_supported() {
    for checker in [ComponentSet::all(), ComponentSet::new(), ComponentSet::new().with("phpcr-adapter")] {
        let expect_gate = checker.missing_component(BackendKind::Phpcr);
        let factory = factory_with(Arc::new(RecordingBuilder::default()), checker);
        match (factory.create(Config::for_adapter("phpcr")), expect_gate) {
            (Err(FactoryError::AdapterNotSupported(name)), None) => assert_eq!(name, "phpcr"),
            (Err(FactoryError::PackageRequired { component, .. }), Some(missing)) => {
                assert_eq!(component, missing)
            }
            (Err(e), _) => panic!("unexpected error: {}", e),
            (Ok(_), _) => panic!("phpcr must not build"),
        }
    }
}

#[test]
fn test_s3_injects_client_built_from_full_config() {
    let (builder, factory) = everything_available();
    let config = Config::for_adapter("s3")
        .with("region", "eu-west-1")
        .with("bucket", "recordings");

    let backend = factory.create(config.clone()).unwrap();
    assert_eq!(backend.backend_type(), "s3");

    let calls = builder.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], Call::Client(ClientKind::S3, config));

    let shaped = fake_config(&backend);
    assert_eq!(shaped.get_str("bucket"), Some("recordings"));
    assert_eq!(client_name(shaped, "client"), "s3");
}

#[test]
fn test_client_backed_kinds() {
    let cases = [
        ("copy", ClientKind::CopyApi),
        ("dropbox", ClientKind::Dropbox),
        ("webdav", ClientKind::WebDav),
    ];

    for (adapter, client) in cases {
        let (builder, factory) = everything_available();
        let backend = factory
            .create(Config::for_adapter(adapter).with("token", "t"))
            .unwrap();

        assert_eq!(backend.backend_type(), adapter);
        assert!(matches!(builder.calls()[0], Call::Client(kind, _) if kind == client));
        assert_eq!(client_name(fake_config(&backend), "client"), client.as_str());
        assert_eq!(fake_config(&backend).get_str("token"), Some("t"));
    }
}

#[test]
fn test_pass_through_kinds() {
    for adapter in ["ftp", "sftp", "zip"] {
        let (builder, factory) = everything_available();
        let config = Config::for_adapter(adapter)
            .with("endpoint", "files.example.com")
            .with("root", "/srv");

        let backend = factory.create(config.clone()).unwrap();
        assert_eq!(fake_config(&backend), &config);
        assert_eq!(builder.calls().len(), 1);
    }
}

#[test]
fn test_azure_shaping() {
    let (builder, factory) = everything_available();
    let config = Config::for_adapter("azure")
        .with("account-name", "acct")
        .with("api-key", "secret");

    let backend = factory.create(config).unwrap();

    match &builder.calls()[0] {
        Call::Client(ClientKind::AzureBlobService, service) => assert_eq!(
            service.get_str("connection-string"),
            Some("DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=secret")
        ),
        other => panic!("unexpected first call: {:?}", other),
    }

    let shaped = fake_config(&backend);
    assert_eq!(shaped.get_str("container"), Some(AZURE_CONTAINER));
    assert_eq!(client_name(shaped, "client"), "azure-blob-service");
    assert!(!shaped.contains_key("api-key"));
}

#[test]
fn test_gridfs_opens_connection_from_db_name() {
    let (builder, factory) = everything_available();
    let backend = factory
        .create(Config::for_adapter("gridfs").with("dbName", "media"))
        .unwrap();

    let calls = builder.calls();
    assert_eq!(calls[0], Call::Grid("media".to_string()));
    assert_eq!(client_name(fake_config(&backend), "driver"), "media");
    assert!(!calls.iter().any(|c| matches!(c, Call::Client(..))));
}

#[test]
fn test_rackspace_resolves_container() {
    let (builder, factory) = everything_available();
    let config = Config::for_adapter("rackspace")
        .with("username", "me")
        .with("container", "assets");

    let backend = factory.create(config).unwrap();
    let calls = builder.calls();

    match &calls[0] {
        Call::Client(ClientKind::OpenStackIdentity, identity) => {
            assert_eq!(identity.get_str("url"), Some(RACKSPACE_IDENTITY_ENDPOINT));
            assert_eq!(identity.get_str("username"), Some("me"));
        }
        other => panic!("unexpected first call: {:?}", other),
    }
    match &calls[2] {
        Call::Client(ClientKind::ObjectStoreContainer, lookup) => {
            assert_eq!(lookup.get_str("container"), Some("assets"));
            assert_eq!(client_name(lookup, "service"), "object-store-service");
        }
        other => panic!("unexpected third call: {:?}", other),
    }

    assert_eq!(
        client_name(fake_config(&backend), "container"),
        "object-store-container"
    );
}

#[test]
fn test_rackspace_keeps_explicit_identity_url() {
    let (builder, factory) = everything_available();
    factory
        .create(Config::for_adapter("rackspace").with("url", "https://identity.local/"))
        .unwrap();

    match &builder.calls()[0] {
        Call::Client(_, identity) => assert_eq!(identity.get_str("url"), Some("https://identity.local/")),
        other => panic!("unexpected first call: {:?}", other),
    }
}

#[test]
fn test_client_errors_pass_through_unchanged() {
    let builder = Arc::new(RecordingBuilder::failing_on(ClientKind::WebDav));
    let factory = factory_with(builder.clone(), ComponentSet::all());

    match factory.create(Config::for_adapter("webdav")) {
        Err(FactoryError::External(e)) => assert_eq!(e.to_string(), "webdav client unreachable"),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("failing client should stop construction"),
    }

    // the backend constructor was never reached
    assert_eq!(builder.calls().len(), 1);
}

#[test]
fn test_create_from_uri() {
    let factory = AdapterFactory::builtin();

    let backend = factory.create_from_uri("memory:///").unwrap();
    assert_eq!(backend.backend_type(), "memory");

    let backend = factory
        .create_from_uri("replicate:///?source[adapter]=memory&replica[adapter]=null")
        .unwrap();
    assert_eq!(backend.backend_type(), "replicate");

    assert!(matches!(
        factory.create_from_uri("not-a-uri"),
        Err(FactoryError::InvalidUri(uri)) if uri == "not-a-uri"
    ));
}

#[test]
fn test_constructor_table_factory() {
    let mut table = ConstructorTable::new();
    table.register_backend(BackendKind::Zip, |config| {
        Ok(Arc::new(FakeBackend {
            kind: BackendKind::Zip,
            config: config.clone(),
        }) as Backend)
    });
    let factory = AdapterFactory::with_constructors(table);

    let backend = factory.create_from_uri("zip:///tmp/archive.zip").unwrap();
    assert_eq!(fake_config(&backend).get_str("root"), Some("/tmp/archive.zip"));
    assert!(factory.is_available(BackendKind::Zip));

    // sftp is gated but has no constructor registered
    assert!(matches!(
        factory.create(Config::for_adapter("sftp")),
        Err(FactoryError::PackageRequired { .. })
    ));
}

#[test]
fn test_factory_is_shareable_across_threads() {
    let factory = Arc::new(AdapterFactory::builtin());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let factory = factory.clone();
            std::thread::spawn(move || {
                let adapter = if i % 2 == 0 { "memory" } else { "null" };
                factory
                    .create(Config::for_adapter(adapter))
                    .map(|b| b.backend_type().to_string())
                    .unwrap()
            })
        })
        .collect();

    let kinds: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(kinds, vec!["memory", "null", "memory", "null"]);
}

#[tokio::test]
async fn test_local_backend_from_uri_round_trip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let uri = format!("local://{}", temp_dir.path().display());
    let factory = AdapterFactory::builtin();

    let backend = factory.create_from_uri(&uri).unwrap();
    backend
        .write("nested/file.txt", Bytes::from_static(b"payload"))
        .await
        .unwrap();

    assert_eq!(&backend.read("nested/file.txt").await.unwrap()[..], b"payload");
    assert!(temp_dir.path().join("nested/file.txt").exists());
}
