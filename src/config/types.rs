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

// Configuration mapping that drives backend selection and construction

use crate::storage::builder::ClientHandle;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Reserved configuration keys
pub mod keys {
    pub const ADAPTER: &str = "adapter";
    pub const ENDPOINT: &str = "endpoint";
    pub const ROOT: &str = "root";
    pub const PREFIX: &str = "prefix";
    pub const CLIENT: &str = "client";
    pub const CONTAINER: &str = "container";
    pub const DRIVER: &str = "driver";
    pub const PORT: &str = "port";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const ACCOUNT_NAME: &str = "account-name";
    pub const API_KEY: &str = "api-key";
    pub const DB_NAME: &str = "dbName";
    pub const SOURCE: &str = "source";
    pub const REPLICA: &str = "replica";
    pub const URL: &str = "url";
    pub const SERVICE: &str = "service";
    pub const CONNECTION_STRING: &str = "connection-string";
}

/// Adapter used when a configuration names none
pub const DEFAULT_ADAPTER: &str = "local";

/// A single configuration value.
///
/// `Handle` values only exist at runtime: they carry clients and driver
/// handles injected while shaping a configuration for construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Text(String),
    Nested(Config),
    Handle(ClientHandle),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Config> {
        match self {
            ConfigValue::Nested(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<&ClientHandle> {
        match self {
            ConfigValue::Handle(h) => Some(h),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Text(s)
    }
}

impl From<Config> for ConfigValue {
    fn from(c: Config) -> Self {
        ConfigValue::Nested(c)
    }
}

impl From<ClientHandle> for ConfigValue {
    fn from(h: ClientHandle) -> Self {
        ConfigValue::Handle(h)
    }
}

/// Flat key/value configuration for one backend.
///
/// Composite kinds nest full configurations under their own keys
/// (`source` and `replica` for `replicate`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    entries: BTreeMap<String, ConfigValue>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration selecting `adapter` with no other options
    pub fn for_adapter(adapter: impl Into<String>) -> Self {
        Self::new().with(keys::ADAPTER, adapter.into())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Insert `value` only when `key` is not already set
    pub fn insert_default(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.entries.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Set a value below nested keys, creating intermediate mappings.
    ///
    /// A non-mapping value found on the way is replaced by a mapping.
    pub fn insert_path(&mut self, path: &[&str], value: impl Into<ConfigValue>) {
        match path {
            [] => {}
            [last] => {
                self.insert(*last, value);
            }
            [first, rest @ ..] => {
                let slot = self
                    .entries
                    .entry((*first).to_string())
                    .or_insert_with(|| ConfigValue::Nested(Config::new()));
                if !matches!(slot, ConfigValue::Nested(_)) {
                    *slot = ConfigValue::Nested(Config::new());
                }
                if let ConfigValue::Nested(inner) = slot {
                    inner.insert_path(rest, value);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    pub fn get_nested(&self, key: &str) -> Option<&Config> {
        self.get(key).and_then(ConfigValue::as_nested)
    }

    pub fn get_handle(&self, key: &str) -> Option<&ClientHandle> {
        self.get(key).and_then(ConfigValue::as_handle)
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Adapter name, `local` when absent.
    ///
    /// A non-text `adapter` value yields an empty name, which matches no kind.
    pub fn adapter(&self) -> &str {
        match self.get(keys::ADAPTER) {
            None => DEFAULT_ADAPTER,
            Some(value) => value.as_str().unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Config::new();
        for (k, v) in iter {
            config.insert(k, v);
        }
        config
    }
}

impl IntoIterator for Config {
    type Item = (String, ConfigValue);
    type IntoIter = btree_map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Config {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = btree_map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Text(s) => serializer.serialize_str(s),
            ConfigValue::Nested(c) => c.serialize(serializer),
            ConfigValue::Handle(h) => serializer.serialize_str(&format!("<client:{}>", h.kind())),
        }
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct ConfigValueVisitor;

impl<'de> Visitor<'de> for ConfigValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a scalar or a mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Text(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Text(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Text(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Text(v.to_string()))
    }

    // YAML reads an unquoted `null` as a null value; keep the word so that
    // `adapter: null` selects the null backend
    fn visit_unit<E: de::Error>(self) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Text("null".to_string()))
    }

    fn visit_none<E: de::Error>(self) -> Result<ConfigValue, E> {
        self.visit_unit()
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Text(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<ConfigValue, A::Error> {
        ConfigVisitor.visit_map(map).map(ConfigValue::Nested)
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConfigValueVisitor)
    }
}

struct ConfigVisitor;

impl<'de> Visitor<'de> for ConfigVisitor {
    type Value = Config;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping of configuration options")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Config, A::Error> {
        let mut config = Config::new();
        while let Some((key, value)) = map.next_entry::<String, ConfigValue>()? {
            config.insert(key, value);
        }
        Ok(config)
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ConfigVisitor)
    }
}
