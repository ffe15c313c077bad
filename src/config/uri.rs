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

// URI to configuration normalization
//
// `scheme://host/path?query` becomes:
// - adapter  = scheme
// - endpoint = host (omitted for `scheme:///path`)
// - root, prefix = path, only when one follows the authority
// - one entry per query pair; `a[b]=c` nests as a = {b: c}
//
// Scheme and path are taken verbatim from the input text: no case folding,
// dot-segment removal or percent-decoding.

use super::types::{keys, Config};
use crate::error::{FactoryError, Result};
use std::borrow::Cow;
use tracing::debug;
use url::Url;

/// Stands in for the empty host of `scheme:///path`.
///
/// Generic URI parsers treat `//` as the start of an authority and either
/// reject an empty host or take the first path segment as the host.
const HOST_PLACEHOLDER: &str = "host-placeholder.invalid";

/// Deepest bracket nesting accepted in a query key, counting the base name.
/// Deeper keys are stored literally.
const MAX_KEY_DEPTH: usize = 64;

/// Parse a storage URI into a backend configuration.
///
/// Fails with [`FactoryError::InvalidUri`] carrying the original text when
/// the string has no scheme or cannot be decomposed.
pub fn parse_uri(uri: &str) -> Result<Config> {
    let marked = mark_empty_host(uri);
    let url = Url::parse(&marked).map_err(|e| {
        debug!("Rejecting URI '{}': {}", uri, e);
        FactoryError::invalid_uri(uri)
    })?;

    let mut config = Config::new();

    if url.query().is_some() {
        for (key, value) in url.query_pairs() {
            let value = value.into_owned();
            match key_path(&key) {
                Some(path) => config.insert_path(&path, value),
                None => {
                    config.insert(&*key, value);
                }
            }
        }
    }

    let raw = RawParts::split(&marked);
    config.insert(keys::ADAPTER, raw.scheme);

    if let Some(host) = url.host_str() {
        if !host.is_empty() && host != HOST_PLACEHOLDER {
            config.insert(keys::ENDPOINT, host);
        }
    }

    if let Some(port) = url.port() {
        config.insert_default(keys::PORT, port.to_string());
    }

    if !url.username().is_empty() {
        config.insert_default(keys::USERNAME, decode(url.username(), uri)?);
    }

    if let Some(password) = url.password() {
        config.insert_default(keys::PASSWORD, decode(password, uri)?);
    }

    if let Some(path) = raw.path {
        config.insert(keys::ROOT, path);
        config.insert(keys::PREFIX, path);
    }

    debug!(
        "Parsed URI into '{}' configuration with {} keys",
        config.adapter(),
        config.len()
    );

    Ok(config)
}

/// Insert the host placeholder into `scheme:///...`.
fn mark_empty_host(uri: &str) -> Cow<'_, str> {
    match uri.find(':') {
        Some(idx) if uri[idx..].starts_with(":///") => Cow::Owned(format!(
            "{}://{}{}",
            &uri[..idx],
            HOST_PLACEHOLDER,
            &uri[idx + 3..]
        )),
        _ => Cow::Borrowed(uri),
    }
}

/// Scheme and path exactly as written.
///
/// The parsed [`Url`] normalizes both, and gives special schemes such as
/// `ftp` a `/` path even when the input has none.
struct RawParts<'a> {
    scheme: &'a str,
    path: Option<&'a str>,
}

impl<'a> RawParts<'a> {
    /// Split text that [`Url::parse`] has already accepted.
    fn split(text: &'a str) -> Self {
        let text = text.trim_matches(|c: char| c <= ' ');
        let (scheme, rest) = text.split_once(':').unwrap_or((text, ""));
        let hier = rest.split(['?', '#']).next().unwrap_or_default();
        let path = match hier.strip_prefix("//") {
            Some(authority_and_path) => authority_and_path
                .find('/')
                .map(|idx| &authority_and_path[idx..]),
            None => Some(hier).filter(|p| !p.is_empty()),
        };
        RawParts { scheme, path }
    }
}

/// Split `a[b][c]` into `["a", "b", "c"]`.
///
/// Returns `None` for plain keys and for keys that do not follow the
/// bracket form exactly (empty segments, unbalanced brackets, more than
/// [`MAX_KEY_DEPTH`] segments); those are kept as literal keys.
fn key_path(key: &str) -> Option<Vec<&str>> {
    let open = key.find('[')?;
    let (base, mut rest) = key.split_at(open);
    if base.is_empty() {
        return None;
    }

    let mut path = vec![base];
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let segment = &inner[..close];
        if segment.is_empty() || path.len() == MAX_KEY_DEPTH {
            return None;
        }
        path.push(segment);
        rest = &inner[close + 1..];
    }
    Some(path)
}

fn decode(text: &str, uri: &str) -> Result<String> {
    urlencoding::decode(text)
        .map(Cow::into_owned)
        .map_err(|_| FactoryError::invalid_uri(uri))
}
