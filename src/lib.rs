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

// Storage backend factory
//
// Turns a URI such as `s3://bucket/prefix?region=eu-west-1` or an
// equivalent key/value configuration into a storage backend:
// - Normalizes URIs into configuration, including `scheme:///path`
// - Dispatches on the `adapter` key over a closed set of backend kinds
// - Gates construction on optional component availability
// - Builds composite `replicate` backends recursively

pub mod config;
pub mod error;
pub mod storage;

// Re-export main types
pub use config::{load_config, parse_uri, Config, ConfigLoader, ConfigValue};
pub use error::{FactoryError, Result};
pub use storage::{
    AdapterFactory, AvailabilityChecker, Backend, BackendKind, ClientHandle, ClientKind,
    ComponentSet, ConstructorTable, InstanceBuilder, ObjectMeta, StorageBackend,
};
