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

// The closed set of backend kinds the factory can produce

use std::fmt;
use std::str::FromStr;

/// Backend kind, selected by the `adapter` configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Local,
    S3,
    Azure,
    Copy,
    Dropbox,
    Ftp,
    Sftp,
    GridFs,
    Memory,
    Null,
    Rackspace,
    WebDav,
    Phpcr,
    Zip,
    Replicate,
}

impl BackendKind {
    pub const ALL: [BackendKind; 15] = [
        BackendKind::Local,
        BackendKind::S3,
        BackendKind::Azure,
        BackendKind::Copy,
        BackendKind::Dropbox,
        BackendKind::Ftp,
        BackendKind::Sftp,
        BackendKind::GridFs,
        BackendKind::Memory,
        BackendKind::Null,
        BackendKind::Rackspace,
        BackendKind::WebDav,
        BackendKind::Phpcr,
        BackendKind::Zip,
        BackendKind::Replicate,
    ];

    /// Adapter name as it appears in URIs and configuration
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::S3 => "s3",
            BackendKind::Azure => "azure",
            BackendKind::Copy => "copy",
            BackendKind::Dropbox => "dropbox",
            BackendKind::Ftp => "ftp",
            BackendKind::Sftp => "sftp",
            BackendKind::GridFs => "gridfs",
            BackendKind::Memory => "memory",
            BackendKind::Null => "null",
            BackendKind::Rackspace => "rackspace",
            BackendKind::WebDav => "webdav",
            BackendKind::Phpcr => "phpcr",
            BackendKind::Zip => "zip",
            BackendKind::Replicate => "replicate",
        }
    }

    /// Optional components that must be present before this kind can be
    /// built, checked in order.
    pub fn required_components(self) -> &'static [&'static str] {
        match self {
            BackendKind::Local | BackendKind::Ftp | BackendKind::Null => &[],
            BackendKind::S3 => &["s3-adapter"],
            BackendKind::Azure => &["azure-adapter"],
            BackendKind::Copy => &["copy-adapter"],
            BackendKind::Dropbox => &["dropbox-adapter"],
            BackendKind::Sftp => &["sftp-adapter"],
            BackendKind::GridFs => &["gridfs-adapter"],
            BackendKind::Memory => &["memory-adapter"],
            BackendKind::Rackspace => &["rackspace-adapter"],
            BackendKind::WebDav => &["webdav-adapter"],
            BackendKind::Phpcr => &["phpcr-adapter", "phpcr-dbal-transport"],
            BackendKind::Zip => &["zip-adapter"],
            BackendKind::Replicate => &["replicate-adapter"],
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}
