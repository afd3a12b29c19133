// SPDX-License-Identifier: AGPL-3.0-or-later

//! Parsed GraphQL responses with normalized access to the returned items.
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ClientError;

const JSON_KEY_DATA: &str = "data";
const JSON_KEY_ERRORS: &str = "errors";
const JSON_KEY_MESSAGE: &str = "message";
const JSON_KEY_ITEMS: &str = "items";
const JSON_KEY_EDGES: &str = "edges";
const JSON_KEY_NODE: &str = "node";
const JSON_KEY_PAGE_INFO: &str = "pageInfo";

/// A single error entry sent by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQlError {
    message: String,
    json: Value,
}

impl GraphQlError {
    fn from_json(json: &Value) -> Self {
        let message = match json.get(JSON_KEY_MESSAGE) {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Self {
            message,
            json: json.clone(),
        }
    }

    /// Human readable error message, empty if the server sent none.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Full error object including locations, path and extensions.
    pub fn json(&self) -> &Value {
        &self.json
    }
}

/// Response of a GraphQL query.
///
/// Result lists are found independent of their shape: both `data.<x>List.items` and the
/// connection form `data.<x>Paginated.edges[].node` are exposed through
/// [`GraphQlResponse::items`]. For the connection form the `pageInfo` object is kept as well.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQlError>>,
    items: Option<Value>,
    page_info: Option<Value>,
}

impl GraphQlResponse {
    /// Parses a response body.
    pub fn parse(body: &str) -> Result<Self, ClientError> {
        let json: Value = serde_json::from_str(body).map_err(ClientError::InvalidResponse)?;
        Ok(Self::from_json(json))
    }

    /// Unwraps an already parsed response document.
    pub fn from_json(mut json: Value) -> Self {
        let data = json
            .get_mut(JSON_KEY_DATA)
            .map(Value::take)
            .filter(|data| !data.is_null());

        let errors = json.get(JSON_KEY_ERRORS).map(|errors| match errors {
            Value::Array(entries) => entries.iter().map(GraphQlError::from_json).collect(),
            _ => Vec::new(),
        });

        let (items, page_info) = match &data {
            Some(data) => scan_items(data),
            None => (None, None),
        };

        Self {
            data,
            errors,
            items,
            page_info,
        }
    }

    /// The `data` member, `None` if the server did not send any.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Result items if the response contains a list or a connection.
    pub fn items(&self) -> Option<&[Value]> {
        self.items
            .as_ref()
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Deserializes every item into `T`.
    ///
    /// Returns an empty list when the response has no items. The first item which can't be
    /// converted aborts with [`ClientError::Mapping`].
    pub fn items_as<T: DeserializeOwned>(&self) -> Result<Vec<T>, ClientError> {
        let items = match self.items() {
            Some(items) => items,
            None => return Ok(Vec::new()),
        };

        items
            .iter()
            .map(|item| {
                T::deserialize(item).map_err(|source| ClientError::Mapping {
                    item: item.to_string(),
                    target: std::any::type_name::<T>(),
                    source,
                })
            })
            .collect()
    }

    /// Returns true if the response has at least one item.
    pub fn has_items(&self) -> bool {
        self.items().map_or(false, |items| !items.is_empty())
    }

    /// Returns true if the server sent at least one error.
    pub fn has_errors(&self) -> bool {
        self.errors
            .as_ref()
            .map_or(false, |errors| !errors.is_empty())
    }

    /// Errors as sent by the server, `None` if the response had no `errors` member.
    pub fn errors(&self) -> Option<&[GraphQlError]> {
        self.errors.as_deref()
    }

    /// The `pageInfo` object of a connection response.
    pub fn page_info(&self) -> Option<&Value> {
        self.page_info.as_ref()
    }

    /// All error messages joined by `, `.
    pub fn errors_string(&self) -> String {
        match &self.errors {
            Some(errors) => errors
                .iter()
                .map(GraphQlError::message)
                .collect::<Vec<_>>()
                .join(", "),
            None => String::new(),
        }
    }
}

impl From<Value> for GraphQlResponse {
    fn from(json: Value) -> Self {
        Self::from_json(json)
    }
}

impl fmt::Display for GraphQlResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[GraphQlResponse ")?;
        if let Some(data) = &self.data {
            let pretty = serde_json::to_string_pretty(data).map_err(|_| fmt::Error)?;
            write!(f, "data: \n{}\n", pretty)?;
        }
        if self.errors.is_some() {
            write!(f, "errors: {}", self.errors_string())?;
        }
        write!(f, "]")
    }
}

/// Finds the first child of `data` holding `items` or `edges`.
fn scan_items(data: &Value) -> (Option<Value>, Option<Value>) {
    let children: Box<dyn Iterator<Item = &Value>> = match data {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(elements) => Box::new(elements.iter()),
        _ => return (None, None),
    };

    for child in children {
        if let Some(items) = child.get(JSON_KEY_ITEMS) {
            return (Some(items.clone()), None);
        }

        if let Some(edges) = child.get(JSON_KEY_EDGES) {
            let nodes = edges
                .as_array()
                .map(|edges| {
                    edges
                        .iter()
                        .map(|edge| edge.get(JSON_KEY_NODE).cloned().unwrap_or(Value::Null))
                        .collect()
                })
                .unwrap_or_default();

            return (
                Some(Value::Array(nodes)),
                child.get(JSON_KEY_PAGE_INFO).cloned(),
            );
        }
    }

    (None, None)
}
