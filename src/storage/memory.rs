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

// In-memory backend

use super::backend::{ObjectMeta, StorageBackend};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::any::Any;

struct StoredObject {
    data: Bytes,
    modified: DateTime<Utc>,
}

/// Backend keeping every object in a concurrent map; contents are lost on drop
#[derive(Default)]
pub struct MemoryBackend {
    objects: DashMap<String, StoredObject>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, path: &str) -> Result<Bytes> {
        self.objects
            .get(normalize(path))
            .map(|object| object.data.clone())
            .ok_or_else(|| anyhow!("object not found: {}", path))
    }

    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        self.objects.insert(
            normalize(path).to_string(),
            StoredObject {
                data,
                modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = normalize(prefix);
        let mut paths: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        Ok(paths)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.objects.remove(normalize(path));
        Ok(())
    }

    async fn metadata(&self, path: &str) -> Result<Option<ObjectMeta>> {
        let path = normalize(path);
        Ok(self.objects.get(path).map(|object| ObjectMeta {
            path: path.to_string(),
            size: object.data.len() as u64,
            last_modified: Some(object.modified),
        }))
    }

    fn backend_type(&self) -> &str {
        "memory"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
