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

// Errors raised while turning a URI or configuration into a backend

/// Failure to resolve or construct a storage backend.
///
/// Errors raised by external client or backend constructors are carried
/// unchanged in [`FactoryError::External`].
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// The string has no scheme or cannot be split into URI parts.
    #[error("invalid URI: \"{0}\"")]
    InvalidUri(String),

    /// The adapter name matches no registered kind, or names a kind that
    /// cannot be built.
    #[error("adapter \"{0}\" is not supported")]
    AdapterNotSupported(String),

    /// The component implementing the adapter is not present.
    #[error("adapter \"{adapter}\" requires the \"{component}\" component to be installed")]
    PackageRequired { adapter: String, component: String },

    /// A key the adapter depends on is missing or has the wrong shape.
    #[error("adapter \"{adapter}\": option \"{key}\" {reason}")]
    InvalidOption {
        adapter: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl FactoryError {
    pub fn invalid_uri(uri: impl Into<String>) -> Self {
        Self::InvalidUri(uri.into())
    }

    pub fn adapter_not_supported(name: impl Into<String>) -> Self {
        Self::AdapterNotSupported(name.into())
    }

    pub fn package_required(adapter: impl Into<String>, component: impl Into<String>) -> Self {
        Self::PackageRequired {
            adapter: adapter.into(),
            component: component.into(),
        }
    }

    pub fn invalid_option(
        adapter: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            adapter: adapter.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = FactoryError> = std::result::Result<T, E>;
