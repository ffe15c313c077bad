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

// Component availability checks that gate backend construction

use super::kind::BackendKind;
use std::collections::BTreeSet;

/// Reports whether the optional component behind a backend kind is present.
///
/// Implementations must be cheap and free of side effects: the factory
/// consults them before any client is opened.
pub trait AvailabilityChecker: Send + Sync {
    fn component_available(&self, component: &str) -> bool;

    /// First required component of `kind` that is not available
    fn missing_component(&self, kind: BackendKind) -> Option<&'static str> {
        kind.required_components()
            .iter()
            .copied()
            .find(|component| !self.component_available(component))
    }

    fn is_available(&self, kind: BackendKind) -> bool {
        self.missing_component(kind).is_none()
    }
}

impl<F> AvailabilityChecker for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn component_available(&self, component: &str) -> bool {
        self(component)
    }
}

/// Registration table of installed components, filled at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSet {
    components: BTreeSet<String>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Components of the backends compiled into this crate
    pub fn builtin() -> Self {
        let mut set = Self::new();
        for kind in [BackendKind::Memory, BackendKind::Replicate] {
            set.register_kind(kind);
        }
        set
    }

    /// Every component of every kind
    pub fn all() -> Self {
        let mut set = Self::new();
        for kind in BackendKind::ALL {
            set.register_kind(kind);
        }
        set
    }

    #[must_use]
    pub fn with(mut self, component: impl Into<String>) -> Self {
        self.register(component);
        self
    }

    pub fn register(&mut self, component: impl Into<String>) -> &mut Self {
        self.components.insert(component.into());
        self
    }

    /// Register all components `kind` requires
    pub fn register_kind(&mut self, kind: BackendKind) -> &mut Self {
        for component in kind.required_components() {
            self.components.insert((*component).to_string());
        }
        self
    }

    pub fn remove(&mut self, component: &str) -> bool {
        self.components.remove(component)
    }

    pub fn contains(&self, component: &str) -> bool {
        self.components.contains(component)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }
}

impl AvailabilityChecker for ComponentSet {
    fn component_available(&self, component: &str) -> bool {
        self.contains(component)
    }
}
