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

// Construction of external clients and backends
//
// Backends that live outside this crate (object stores, FTP/SFTP, WebDAV,
// archives, ...) are built through an injected `InstanceBuilder`. The
// factory shapes the configuration (injecting clients under `client`,
// `container` or `driver`) and the builder maps configuration keys onto the
// target constructor's parameters.

use super::availability::ComponentSet;
use super::backend::Backend;
use super::kind::BackendKind;
use crate::config::Config;
use anyhow::{bail, Result};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Clients and sub-resources a backend may need before it can be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    S3,
    AzureBlobService,
    CopyApi,
    Dropbox,
    OpenStackIdentity,
    ObjectStoreService,
    ObjectStoreContainer,
    WebDav,
    GridFs,
}

impl ClientKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientKind::S3 => "s3",
            ClientKind::AzureBlobService => "azure-blob-service",
            ClientKind::CopyApi => "copy-api",
            ClientKind::Dropbox => "dropbox",
            ClientKind::OpenStackIdentity => "openstack-identity",
            ClientKind::ObjectStoreService => "object-store-service",
            ClientKind::ObjectStoreContainer => "object-store-container",
            ClientKind::WebDav => "webdav",
            ClientKind::GridFs => "gridfs",
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-erased client carried inside a [`Config`]
#[derive(Clone)]
pub struct ClientHandle {
    kind: ClientKind,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ClientHandle {
    pub fn new<T: Any + Send + Sync>(kind: ClientKind, client: T) -> Self {
        Self {
            kind,
            inner: Arc::new(client),
        }
    }

    pub fn kind(&self) -> ClientKind {
        self.kind
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ClientHandle {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Builds external clients and backends from configuration.
///
/// Each constructor reads the keys matching its own parameter names;
/// a parameter without a matching key is left to the constructor's
/// default. Errors are returned to the caller unchanged.
pub trait InstanceBuilder: Send + Sync {
    fn build_client(&self, kind: ClientKind, config: &Config) -> Result<ClientHandle>;

    fn build_backend(&self, kind: BackendKind, config: &Config) -> Result<Backend>;

    /// Open a grid-store bucket for a database.
    ///
    /// Unlike other clients this takes only the database name instead of
    /// the whole configuration.
    fn open_grid(&self, db_name: &str) -> Result<ClientHandle>;
}

type ClientConstructor = Arc<dyn Fn(&Config) -> Result<ClientHandle> + Send + Sync>;
type BackendConstructor = Arc<dyn Fn(&Config) -> Result<Backend> + Send + Sync>;
type GridConnector = Arc<dyn Fn(&str) -> Result<ClientHandle> + Send + Sync>;

/// [`InstanceBuilder`] backed by constructors registered at startup
#[derive(Clone, Default)]
pub struct ConstructorTable {
    clients: HashMap<ClientKind, ClientConstructor>,
    backends: HashMap<BackendKind, BackendConstructor>,
    grid: Option<GridConnector>,
}

impl ConstructorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_client<F>(&mut self, kind: ClientKind, constructor: F) -> &mut Self
    where
        F: Fn(&Config) -> Result<ClientHandle> + Send + Sync + 'static,
    {
        self.clients.insert(kind, Arc::new(constructor));
        self
    }

    pub fn register_backend<F>(&mut self, kind: BackendKind, constructor: F) -> &mut Self
    where
        F: Fn(&Config) -> Result<Backend> + Send + Sync + 'static,
    {
        self.backends.insert(kind, Arc::new(constructor));
        self
    }

    pub fn register_grid_connector<F>(&mut self, connector: F) -> &mut Self
    where
        F: Fn(&str) -> Result<ClientHandle> + Send + Sync + 'static,
    {
        self.grid = Some(Arc::new(connector));
        self
    }

    pub fn has_backend(&self, kind: BackendKind) -> bool {
        self.backends.contains_key(&kind)
    }

    /// Built-in components plus those of every kind with a registered
    /// backend constructor
    pub fn available_components(&self) -> ComponentSet {
        let mut set = ComponentSet::builtin();
        for kind in self.backends.keys() {
            set.register_kind(*kind);
        }
        set
    }
}

impl fmt::Debug for ConstructorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorTable")
            .field("clients", &self.clients.keys().collect::<Vec<_>>())
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("grid", &self.grid.is_some())
            .finish()
    }
}

impl InstanceBuilder for ConstructorTable {
    fn build_client(&self, kind: ClientKind, config: &Config) -> Result<ClientHandle> {
        match self.clients.get(&kind) {
            Some(constructor) => constructor(config),
            None => bail!("no constructor registered for {} client", kind),
        }
    }

    fn build_backend(&self, kind: BackendKind, config: &Config) -> Result<Backend> {
        match self.backends.get(&kind) {
            Some(constructor) => constructor(config),
            None => bail!("no constructor registered for {} backend", kind),
        }
    }

    fn open_grid(&self, db_name: &str) -> Result<ClientHandle> {
        match &self.grid {
            Some(connector) => connector(db_name),
            None => bail!("no grid connector registered"),
        }
    }
}
