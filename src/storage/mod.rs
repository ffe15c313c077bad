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

// Storage backend module
//
// A trait-based abstraction over storage backends plus the factory that
// selects and builds one from configuration. Local, memory, null and
// replicate backends ship here; every other kind is built through an
// injected `InstanceBuilder`.

pub mod availability;
pub mod backend;
pub mod builder;
pub mod factory;
pub mod kind;
pub mod local;
pub mod memory;
pub mod null;
pub mod replicate;

pub use availability::{AvailabilityChecker, ComponentSet};
pub use backend::{Backend, ObjectMeta, StorageBackend};
pub use builder::{ClientHandle, ClientKind, ConstructorTable, InstanceBuilder};
pub use factory::AdapterFactory;
pub use kind::BackendKind;
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use null::NullBackend;
pub use replicate::ReplicateBackend;
