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

// Backend that discards everything

use super::backend::{ObjectMeta, StorageBackend};
use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::any::Any;

/// Accepts writes and deletes, never holds an object
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageBackend for NullBackend {
    async fn read(&self, path: &str) -> Result<Bytes> {
        bail!("object not found: {}", path)
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
        "null"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
