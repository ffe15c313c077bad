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

// Storage backend trait produced by the factory

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

/// Metadata for a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub path: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Generic storage backend
///
/// Every kind the factory builds conforms to this capability set.
/// Paths are `/`-separated and relative to the backend's own root.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the full contents of an object
    async fn read(&self, path: &str) -> Result<Bytes>;

    /// Create or replace an object
    async fn write(&self, path: &str, data: Bytes) -> Result<()>;

    /// List object paths starting with `prefix`
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Delete an object; deleting a missing object is not an error
    async fn delete(&self, path: &str) -> Result<()>;

    /// Object metadata, `None` when the object does not exist
    async fn metadata(&self, path: &str) -> Result<Option<ObjectMeta>>;

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.metadata(path).await?.is_some())
    }

    /// Get backend type identifier
    fn backend_type(&self) -> &str;

    /// Access to the concrete type, for callers that need it
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a constructed backend
pub type Backend = Arc<dyn StorageBackend>;
