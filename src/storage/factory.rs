// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Backend factory for creating storage backends from configuration
//
// Every adapter kind owns one build function, registered once when the
// factory is created. `create` looks the adapter name up, checks that the
// kind's components are available, then lets the build function shape the
// configuration and construct the backend.

use super::availability::{AvailabilityChecker, ComponentSet};
use super::backend::Backend;
use super::builder::{ClientKind, ConstructorTable, InstanceBuilder};
use super::kind::BackendKind;
use super::local::LocalBackend;
use super::memory::MemoryBackend;
use super::null::NullBackend;
use super::replicate::ReplicateBackend;
use crate::config::{keys, parse_uri, Config, ConfigValue};
use crate::error::{FactoryError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identity endpoint used by `rackspace` when the configuration sets no `url`
pub const RACKSPACE_IDENTITY_ENDPOINT: &str = "https://lon.identity.api.rackspacecloud.com/v2.0/";

/// Container every `azure` backend is bound to
pub const AZURE_CONTAINER: &str = "my-container";

type BuildFn = fn(&AdapterFactory, Config) -> Result<Backend>;

#[derive(Clone, Copy)]
struct AdapterEntry {
    kind: BackendKind,
    build: BuildFn,
}

fn build_fn(kind: BackendKind) -> BuildFn {
    match kind {
        BackendKind::Local => build_local,
        BackendKind::S3 => build_s3,
        BackendKind::Azure => build_azure,
        BackendKind::Copy => build_copy,
        BackendKind::Dropbox => build_dropbox,
        BackendKind::Ftp => build_ftp,
        BackendKind::Sftp => build_sftp,
        BackendKind::GridFs => build_gridfs,
        BackendKind::Memory => build_memory,
        BackendKind::Null => build_null,
        BackendKind::Rackspace => build_rackspace,
        BackendKind::WebDav => build_webdav,
        BackendKind::Phpcr => build_phpcr,
        BackendKind::Zip => build_zip,
        BackendKind::Replicate => build_replicate,
    }
}

/// Turns URIs and configurations into storage backends.
///
/// The factory holds no mutable state; it can be shared across threads as
/// long as its builder and checker can.
pub struct AdapterFactory {
    builder: Arc<dyn InstanceBuilder>,
    checker: Arc<dyn AvailabilityChecker>,
    registry: HashMap<&'static str, AdapterEntry>,
}

impl AdapterFactory {
    pub fn new(builder: Arc<dyn InstanceBuilder>, checker: Arc<dyn AvailabilityChecker>) -> Self {
        let registry = BackendKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind.as_str(),
                    AdapterEntry {
                        kind,
                        build: build_fn(kind),
                    },
                )
            })
            .collect();

        Self {
            builder,
            checker,
            registry,
        }
    }

    /// Factory for the backends compiled into this crate only
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(ConstructorTable::new()),
            Arc::new(ComponentSet::builtin()),
        )
    }

    /// Factory whose external kinds are served by `table`; a kind counts as
    /// available once its backend constructor is registered.
    pub fn with_constructors(table: ConstructorTable) -> Self {
        let checker = table.available_components();
        Self::new(Arc::new(table), Arc::new(checker))
    }

    /// Parse `uri` and build the backend it describes
    pub fn create_from_uri(&self, uri: &str) -> Result<Backend> {
        let config = parse_uri(uri)?;
        self.create(config)
    }

    /// Build the backend selected by `config`'s `adapter` key (`local` when
    /// absent).
    ///
    /// The component check runs before any client is opened.
    pub fn create(&self, config: Config) -> Result<Backend> {
        let name = config.adapter().to_string();

        let entry = self
            .registry
            .get(name.as_str())
            .copied()
            .ok_or_else(|| FactoryError::adapter_not_supported(&name))?;

        if let Some(component) = self.checker.missing_component(entry.kind) {
            warn!(
                "Adapter '{}' needs component '{}' which is not available",
                name, component
            );
            return Err(FactoryError::package_required(name, component));
        }

        debug!("Building '{}' backend", name);
        let backend = (entry.build)(self, config)?;
        info!("Storage backend created: {}", backend.backend_type());

        Ok(backend)
    }

    /// Adapter names this factory recognizes, sorted
    pub fn supported_adapters(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.registry.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn is_available(&self, kind: BackendKind) -> bool {
        self.checker.is_available(kind)
    }

    fn builder(&self) -> &dyn InstanceBuilder {
        self.builder.as_ref()
    }

    /// Build a client from the full configuration and inject it as `client`
    fn with_client(&self, client: ClientKind, mut config: Config) -> Result<Config> {
        debug!("Building {} client", client);
        let handle = self.builder().build_client(client, &config)?;
        config.insert(keys::CLIENT, handle);
        Ok(config)
    }
}

impl Default for AdapterFactory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("adapters", &self.supported_adapters())
            .finish_non_exhaustive()
    }
}

fn build_local(_factory: &AdapterFactory, mut config: Config) -> Result<Backend> {
    config.insert_default(keys::ROOT, "/");
    Ok(Arc::new(LocalBackend::from_config(&config)))
}

fn build_s3(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    let config = factory.with_client(ClientKind::S3, config)?;
    Ok(factory.builder().build_backend(BackendKind::S3, &config)?)
}

fn build_azure(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    let connection_string = format!(
        "DefaultEndpointsProtocol=https;AccountName={};AccountKey={}",
        config.get_str(keys::ACCOUNT_NAME).unwrap_or_default(),
        config.get_str(keys::API_KEY).unwrap_or_default()
    );
    let service_config = Config::new().with(keys::CONNECTION_STRING, connection_string);
    let blob_service = factory
        .builder()
        .build_client(ClientKind::AzureBlobService, &service_config)?;

    let backend_config = Config::for_adapter(BackendKind::Azure.as_str())
        .with(keys::CLIENT, blob_service)
        .with(keys::CONTAINER, AZURE_CONTAINER);
    Ok(factory
        .builder()
        .build_backend(BackendKind::Azure, &backend_config)?)
}

fn build_copy(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    let config = factory.with_client(ClientKind::CopyApi, config)?;
    Ok(factory.builder().build_backend(BackendKind::Copy, &config)?)
}

fn build_dropbox(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    let config = factory.with_client(ClientKind::Dropbox, config)?;
    Ok(factory.builder().build_backend(BackendKind::Dropbox, &config)?)
}

fn build_ftp(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    Ok(factory.builder().build_backend(BackendKind::Ftp, &config)?)
}

fn build_sftp(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    Ok(factory.builder().build_backend(BackendKind::Sftp, &config)?)
}

fn build_gridfs(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    let db_name = config.get_str(keys::DB_NAME).unwrap_or_default();
    debug!("Opening grid store for database '{}'", db_name);
    let driver = factory.builder().open_grid(db_name)?;

    let backend_config = Config::for_adapter(BackendKind::GridFs.as_str()).with(keys::DRIVER, driver);
    Ok(factory
        .builder()
        .build_backend(BackendKind::GridFs, &backend_config)?)
}

fn build_memory(_factory: &AdapterFactory, _config: Config) -> Result<Backend> {
    Ok(Arc::new(MemoryBackend::new()))
}

fn build_null(_factory: &AdapterFactory, _config: Config) -> Result<Backend> {
    Ok(Arc::new(NullBackend::new()))
}

fn build_rackspace(factory: &AdapterFactory, mut config: Config) -> Result<Backend> {
    let mut identity_config = config.clone();
    identity_config.insert_default(keys::URL, RACKSPACE_IDENTITY_ENDPOINT);
    let identity = factory
        .builder()
        .build_client(ClientKind::OpenStackIdentity, &identity_config)?;
    config.insert(keys::CLIENT, identity);

    let service = factory
        .builder()
        .build_client(ClientKind::ObjectStoreService, &config)?;
    config.insert(keys::SERVICE, service);

    // reads `service` and the container name under `container`
    let container = factory
        .builder()
        .build_client(ClientKind::ObjectStoreContainer, &config)?;
    config.insert(keys::CONTAINER, container);

    Ok(factory
        .builder()
        .build_backend(BackendKind::Rackspace, &config)?)
}

fn build_webdav(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    let config = factory.with_client(ClientKind::WebDav, config)?;
    Ok(factory.builder().build_backend(BackendKind::WebDav, &config)?)
}

fn build_phpcr(_factory: &AdapterFactory, _config: Config) -> Result<Backend> {
    Err(FactoryError::adapter_not_supported(BackendKind::Phpcr.as_str()))
}

fn build_zip(factory: &AdapterFactory, config: Config) -> Result<Backend> {
    Ok(factory.builder().build_backend(BackendKind::Zip, &config)?)
}

fn build_replicate(factory: &AdapterFactory, mut config: Config) -> Result<Backend> {
    let source = take_nested(&mut config, keys::SOURCE)?;
    let replica = take_nested(&mut config, keys::REPLICA)?;

    let source = factory.create(source)?;
    let replica = factory.create(replica)?;

    Ok(Arc::new(ReplicateBackend::new(source, replica)))
}

fn take_nested(config: &mut Config, key: &str) -> Result<Config> {
    match config.remove(key) {
        Some(ConfigValue::Nested(nested)) => Ok(nested),
        Some(_) => Err(FactoryError::invalid_option(
            BackendKind::Replicate.as_str(),
            key,
            "must be a nested configuration",
        )),
        None => Err(FactoryError::invalid_option(
            BackendKind::Replicate.as_str(),
            key,
            "is required",
        )),
    }
}
