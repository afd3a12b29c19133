// SPDX-License-Identifier: AGPL-3.0-or-later

//! Client executing queries against the GraphQL endpoint of a content server.
mod builder;

pub use builder::ClientBuilder;

use http::{Method, StatusCode};
use log::{debug, trace, warn};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::cursor::PagingCursor;
use crate::errors::ClientError;
use crate::persisted::{lookup_str, validate_persisted_query_path, PersistedQuery};
use crate::query::{check_query_for_vars, Query, QueryVariables};
use crate::response::GraphQlResponse;
use crate::transport::{HttpTransport, Transport};

const ENDPOINT_DEFAULT_GRAPHQL: &str = "/content/cq:graphql/global/endpoint.json";
const ENDPOINT_PERSISTED_QUERIES_PERSIST: &str = "/graphql/persist.json";
const ENDPOINT_PERSISTED_QUERIES_EXECUTE: &str = "/graphql/execute.json";
const ENDPOINT_PERSISTED_QUERIES_LIST: &str = "/graphql/list.json/";

const JSON_KEY_QUERIES: &str = "queries";
const JSON_KEY_SHORT_PATH: &str = "shortPath";
const JSON_KEY_PATH: &str = "path";

/// Body of a GraphQL request.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a QueryVariables>,
}

/// Parses `uri` and points a host-only URI to the default GraphQL endpoint.
pub(crate) fn resolve_endpoint(uri: &str) -> Result<Url, ClientError> {
    let mut endpoint = Url::parse(uri).map_err(|source| ClientError::InvalidUri {
        uri: uri.to_string(),
        source,
    })?;

    if endpoint.path().trim().is_empty() || endpoint.path() == "/" {
        endpoint.set_path(ENDPOINT_DEFAULT_GRAPHQL);
    }

    Ok(endpoint)
}

/// Client for the GraphQL API of a headless content server.
///
/// All requests go through a [`Transport`], which is [`HttpTransport`] unless another one was
/// passed in with [`HeadlessClient::with_transport`]. Responses carrying GraphQL errors are
/// reported as [`ClientError::GraphQl`] holding the full response.
#[derive(Debug)]
pub struct HeadlessClient<T = HttpTransport> {
    endpoint: Url,
    transport: T,
}

impl HeadlessClient<HttpTransport> {
    /// Returns a client with default timeouts and without authentication.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        Self::builder().endpoint(endpoint)?.build()
    }

    /// Returns a builder for a client talking HTTP.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T: Transport> HeadlessClient<T> {
    /// Creates a client sending its requests through `transport`.
    pub fn with_transport(endpoint: &str, transport: T) -> Result<Self, ClientError> {
        Ok(Self::from_parts(resolve_endpoint(endpoint)?, transport))
    }

    pub(crate) fn from_parts(endpoint: Url, transport: T) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    /// URI of the GraphQL endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The transport used to send requests.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs a query given as text without sending any variables.
    pub async fn run_query(&self, query: &str) -> Result<GraphQlResponse, ClientError> {
        self.execute_query(query, None).await
    }

    /// Runs a query given as text, every variable has to be declared in the query.
    pub async fn run_query_with_vars(
        &self,
        query: &str,
        variables: &QueryVariables,
    ) -> Result<GraphQlResponse, ClientError> {
        self.execute_query(query, Some(variables)).await
    }

    pub async fn run_built_query(&self, query: &Query) -> Result<GraphQlResponse, ClientError> {
        self.run_built_query_with_vars(query, &QueryVariables::new())
            .await
    }

    pub async fn run_built_query_with_vars(
        &self,
        query: &Query,
        variables: &QueryVariables,
    ) -> Result<GraphQlResponse, ClientError> {
        self.execute_query(&query.generate_query(), Some(variables))
            .await
    }

    /// Runs a query built with offset pagination for the given window.
    pub async fn run_query_offset_limit(
        &self,
        query: &Query,
        offset: u32,
        limit: u32,
    ) -> Result<GraphQlResponse, ClientError> {
        let mut variables = QueryVariables::new();
        variables.offset(offset).limit(limit);
        self.run_built_query_with_vars(query, &variables).await
    }

    /// Returns a cursor fetching `page_size` results per page of a cursor paginated query.
    pub fn create_paging_cursor(&self, query: &Query, page_size: u32) -> PagingCursor<'_, T> {
        self.create_paging_cursor_with_vars(query, page_size, &QueryVariables::new())
    }

    /// Like [`HeadlessClient::create_paging_cursor`], every page also gets `variables`.
    pub fn create_paging_cursor_with_vars(
        &self,
        query: &Query,
        page_size: u32,
        variables: &QueryVariables,
    ) -> PagingCursor<'_, T> {
        PagingCursor::for_query(self, query.generate_query(), page_size, variables.clone())
    }

    /// Returns a cursor paging through a persisted query which declares `$after` and `$first`.
    pub fn create_persisted_paging_cursor(
        &self,
        persisted_query: &PersistedQuery,
        page_size: u32,
        variables: &QueryVariables,
    ) -> PagingCursor<'_, T> {
        PagingCursor::for_persisted_query(
            self,
            persisted_query.short_path().to_string(),
            page_size,
            variables.clone(),
        )
    }

    /// Lists the queries persisted for a configuration, e.g. `wknd-shared`.
    pub async fn list_persisted_queries(
        &self,
        configuration_name: &str,
    ) -> Result<Vec<PersistedQuery>, ClientError> {
        let uri = self.uri_for_path(&format!(
            "{}{}",
            ENDPOINT_PERSISTED_QUERIES_LIST, configuration_name
        ));

        let body = self
            .transport
            .execute(&uri, Method::GET, None, StatusCode::OK)
            .await?;
        let json: Value = serde_json::from_str(&body).map_err(ClientError::InvalidResponse)?;

        let queries = json
            .get(0)
            .and_then(|configuration| configuration.get(JSON_KEY_QUERIES))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ClientError::UnexpectedFormat(format!("no persisted queries found in {}", json))
            })?;

        queries.iter().map(PersistedQuery::from_json).collect()
    }

    /// Runs a persisted query, variables are passed as `;name=value` path parameters.
    ///
    /// Variables set to `null` are left out.
    pub async fn run_persisted_query(
        &self,
        short_path: &str,
        variables: Option<&QueryVariables>,
    ) -> Result<GraphQlResponse, ClientError> {
        validate_persisted_query_path(short_path)?;

        let mut path = format!("{}{}", ENDPOINT_PERSISTED_QUERIES_EXECUTE, short_path);
        if let Some(variables) = variables {
            for (name, value) in variables.iter() {
                let value = match value {
                    Value::Null => continue,
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
                path.push_str(&format!(";{}={}", name, encoded));
            }
        }

        let uri = self.uri_for_path(&path);
        debug!("Running persisted query {}", short_path);

        let body = self
            .transport
            .execute(&uri, Method::GET, None, StatusCode::OK)
            .await?;
        self.unwrap_response(&body)
    }

    /// Stores `query` on the server under `short_path`.
    pub async fn persist_query(
        &self,
        query: &str,
        short_path: &str,
    ) -> Result<PersistedQuery, ClientError> {
        validate_persisted_query_path(short_path)?;

        let uri = self.uri_for_path(&format!(
            "{}{}",
            ENDPOINT_PERSISTED_QUERIES_PERSIST, short_path
        ));

        let body = self
            .transport
            .execute(
                &uri,
                Method::PUT,
                Some(query.to_string()),
                StatusCode::CREATED,
            )
            .await?;
        let json: Value = serde_json::from_str(&body).map_err(ClientError::InvalidResponse)?;

        Ok(PersistedQuery::new(
            lookup_str(&json, &[JSON_KEY_SHORT_PATH])?,
            lookup_str(&json, &[JSON_KEY_PATH])?,
            query,
        ))
    }

    /// Returns the JSON body of a GraphQL request.
    ///
    /// Fails when a variable is not declared in the query text.
    pub fn create_query_request_payload(
        &self,
        query: &str,
        variables: Option<&QueryVariables>,
    ) -> Result<String, ClientError> {
        if let Some(variables) = variables {
            check_query_for_vars(query, variables.names())?;
        }

        let request = QueryRequest { query, variables };
        serde_json::to_string(&request).map_err(ClientError::InvalidResponse)
    }

    async fn execute_query(
        &self,
        query: &str,
        variables: Option<&QueryVariables>,
    ) -> Result<GraphQlResponse, ClientError> {
        let payload = self.create_query_request_payload(query, variables)?;
        debug!("Running query against {}", self.endpoint);
        trace!("Query payload: {}", payload);

        let body = self
            .transport
            .execute(&self.endpoint, Method::POST, Some(payload), StatusCode::OK)
            .await?;
        self.unwrap_response(&body)
    }

    fn unwrap_response(&self, body: &str) -> Result<GraphQlResponse, ClientError> {
        let response = GraphQlResponse::parse(body)?;

        if response.has_errors() {
            warn!("GraphQL response has error(s): {}", response.errors_string());
            return Err(ClientError::GraphQl(Box::new(response)));
        }

        Ok(response)
    }

    /// Same scheme, credentials, host and port as the endpoint, with the given path.
    fn uri_for_path(&self, path: &str) -> Url {
        let mut uri = self.endpoint.clone();
        uri.set_path(path);
        uri.set_query(None);
        uri.set_fragment(None);
        uri
    }
}
