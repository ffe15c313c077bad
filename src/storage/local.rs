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

// Local filesystem backend

use super::backend::{ObjectMeta, StorageBackend};
use crate::config::{keys, Config};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Backend storing objects as files below a root directory.
///
/// Construction does not touch the filesystem; directories are created on
/// first write.
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build from the `root` key, defaulting to `/`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.get_str(keys::ROOT).unwrap_or("/"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an object path onto the filesystem, refusing to leave the root
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        for component in relative.components() {
            if !matches!(component, Component::Normal(_) | Component::CurDir) {
                bail!("path escapes backend root: {}", path);
            }
        }
        Ok(self.root.join(relative))
    }

    /// Object path of a file below the root
    fn object_path(&self, file: &Path) -> Option<String> {
        let relative = file.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn read(&self, path: &str) -> Result<Bytes> {
        let file_path = self.resolve(path)?;
        let data = fs::read(&file_path)
            .await
            .context(format!("Failed to read file: {}", file_path.display()))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        let file_path = self.resolve(path)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create parent directory")?;
        }

        debug!("Writing {} bytes to {}", data.len(), file_path.display());

        let mut file = fs::File::create(&file_path)
            .await
            .context(format!("Failed to create file: {}", file_path.display()))?;

        file.write_all(&data).await.context("Failed to write data")?;
        file.flush().await.context("Failed to flush data")?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim_start_matches('/');
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).context(format!("Failed to list directory: {}", dir.display()))
                }
            };

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if let Some(object) = self.object_path(&entry.path()) {
                    if object.starts_with(prefix) {
                        found.push(object);
                    }
                }
            }
        }

        found.sort();
        Ok(found)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let file_path = self.resolve(path)?;
        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context(format!("Failed to delete file: {}", file_path.display())),
        }
    }

    async fn metadata(&self, path: &str) -> Result<Option<ObjectMeta>> {
        let file_path = self.resolve(path)?;
        let meta = match fs::metadata(&file_path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to stat file"),
        };

        Ok(Some(ObjectMeta {
            path: path.trim_start_matches('/').to_string(),
            size: meta.len(),
            last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
        }))
    }

    fn backend_type(&self) -> &str {
        "local"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
