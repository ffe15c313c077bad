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

// Composite backend mirroring a source into a replica

use super::backend::{Backend, ObjectMeta, StorageBackend};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::any::Any;
use tracing::debug;

/// Writes and deletes go to the source, then the replica.
/// Reads, listings and metadata come from the source only.
pub struct ReplicateBackend {
    source: Backend,
    replica: Backend,
}

impl ReplicateBackend {
    pub fn new(source: Backend, replica: Backend) -> Self {
        Self { source, replica }
    }

    pub fn source(&self) -> &Backend {
        &self.source
    }

    pub fn replica(&self) -> &Backend {
        &self.replica
    }
}

#[async_trait]
impl StorageBackend for ReplicateBackend {
    async fn read(&self, path: &str) -> Result<Bytes> {
        self.source.read(path).await
    }

    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        self.source.write(path, data.clone()).await?;
        debug!("Replicating write of '{}' to {}", path, self.replica.backend_type());
        self.replica
            .write(path, data)
            .await
            .context(format!("Failed to replicate write of '{}'", path))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.source.list(prefix).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.source.delete(path).await?;
        self.replica
            .delete(path)
            .await
            .context(format!("Failed to replicate delete of '{}'", path))
    }

    async fn metadata(&self, path: &str) -> Result<Option<ObjectMeta>> {
        self.source.metadata(path).await
    }

    fn backend_type(&self) -> &str {
        "replicate"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
