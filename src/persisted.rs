// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use serde_json::Value;

use crate::errors::ClientError;

const JSON_KEY_PATH: &str = "path";
const JSON_KEY_SHORT_FORM: &str = "shortForm";
const JSON_KEY_LONG_FORM: &str = "longForm";
const JSON_KEY_DATA: &str = "data";
const JSON_KEY_QUERY: &str = "query";

/// A query stored on the server and addressed by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedQuery {
    short_path: String,
    long_path: String,
    query: String,
}

impl PersistedQuery {
    /// Creates a persisted query from its paths and query text.
    pub fn new(short_path: &str, long_path: &str, query: &str) -> Self {
        Self {
            short_path: short_path.to_string(),
            long_path: long_path.to_string(),
            query: query.to_string(),
        }
    }

    /// Reads one entry of a persisted query listing.
    ///
    /// ```json
    /// { "path": { "shortForm": "/proj/query", "longForm": "/conf/..." }, "data": { "query": "..." } }
    /// ```
    pub fn from_json(json: &Value) -> Result<Self, ClientError> {
        let short_path = lookup_str(json, &[JSON_KEY_PATH, JSON_KEY_SHORT_FORM])?;
        let long_path = lookup_str(json, &[JSON_KEY_PATH, JSON_KEY_LONG_FORM])?;
        let query = lookup_str(json, &[JSON_KEY_DATA, JSON_KEY_QUERY])?;

        Ok(Self::new(short_path, long_path, query))
    }

    /// Path in the form `/<configuration>/<query>` used to execute the query.
    pub fn short_path(&self) -> &str {
        &self.short_path
    }

    /// Repository path of the stored query.
    pub fn long_path(&self) -> &str {
        &self.long_path
    }

    /// Query text stored on the server.
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for PersistedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[PersistedQuery shortPath={}, longPath={}, query={}]",
            self.short_path, self.long_path, self.query
        )
    }
}

/// Returns the string found at the nested `keys` of `json`.
pub(crate) fn lookup_str<'a>(json: &'a Value, keys: &[&str]) -> Result<&'a str, ClientError> {
    let mut current = json;
    for key in keys {
        current = current
            .get(key)
            .ok_or_else(|| ClientError::UnexpectedFormat(format!("missing '{}' in {}", key, json)))?;
    }

    current.as_str().ok_or_else(|| {
        ClientError::UnexpectedFormat(format!("'{}' is not a string in {}", keys.join("."), json))
    })
}

/// Checks that `path` has the form `/<configuration>/<query>`.
pub fn validate_persisted_query_path(path: &str) -> Result<(), ClientError> {
    let invalid = || ClientError::InvalidPersistedQueryPath(path.to_string());

    let segments = path.strip_prefix('/').ok_or_else(invalid)?;
    let segments: Vec<&str> = segments.split('/').collect();

    if segments.len() != 2 || segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}
