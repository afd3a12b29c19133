// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

use crate::response::GraphQlResponse;

/// Errors raised while assembling a query or checking it against its variables.
#[derive(Error, Debug)]
pub enum QueryError {
    /// `build` was called a second time on the same builder.
    #[error("Builder can only be used to create one query")]
    BuilderReused,

    /// No content fragment model was set before building.
    #[error("Content fragment model name is required to build a query")]
    MissingModelName,

    /// Sort clause used an order other than `ASC` or `DESC`.
    #[error("Invalid sorting order '{0}', expected ASC or DESC")]
    InvalidSortingOrder(String),

    /// A variable was passed which the query text does not declare.
    #[error("Required query variable ${0} is not contained in query:\n{1}")]
    MissingVariable(String, String),
}

/// Represents all the ways an interaction with the GraphQL endpoint can fail.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Endpoint could not be parsed as an URI.
    #[error("Invalid GraphQL URI {uri}")]
    InvalidUri {
        /// The rejected input.
        uri: String,

        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// Persisted query path is not in the `/project/query` short form.
    #[error("Invalid path for persisted query: {0}")]
    InvalidPersistedQueryPath(String),

    /// `build` was called a second time on the same client builder.
    #[error("Builder can only be used to create one instance of HeadlessClient")]
    BuilderReused,

    /// Basic and token authentication were both configured.
    #[error("Authentication is already configured")]
    AuthAlreadyConfigured,

    /// Client builder was finished without an endpoint.
    #[error("No endpoint configured")]
    MissingEndpoint,

    /// Authorization value can't be sent as a HTTP header.
    #[error(transparent)]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// Query was malformed or does not declare the passed variables.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// HTTP client could not be set up.
    #[error("Could not create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Server answered with a status code other than the expected one.
    #[error("Unexpected http response code {status}: {body}")]
    UnexpectedStatus {
        /// Received status code.
        status: u16,

        /// Raw response body.
        body: String,
    },

    /// Request could not be sent or its response not be read.
    #[error("Could not execute {method} request to {uri}: {source}")]
    Request {
        /// HTTP method of the failed request.
        method: http::Method,

        /// Target of the failed request.
        uri: String,

        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// Response body is not valid JSON.
    #[error("Could not parse GraphQL response from server: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// Response is valid JSON but misses expected fields.
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Server sent GraphQL errors, the response holds them next to any partial data.
    #[error("GraphQL Response has error(s): {}", .0.errors_string())]
    GraphQl(Box<GraphQlResponse>),

    /// An item of the response could not be deserialized into the requested type.
    #[error("Could not convert item {item} to type {target}")]
    Mapping {
        /// JSON text of the offending item.
        item: String,

        /// Name of the requested type.
        target: &'static str,

        /// Deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Paging cursor was advanced past its last page.
    #[error("There are no more results available")]
    NoMoreResults,

    /// Paging cursor was used with a query which does not return `pageInfo`.
    #[error("Query does not support paging with a cursor, could not find 'pageInfo' in response data:\n{0}")]
    MissingPageInfo(String),
}

impl ClientError {
    /// Returns the parsed response when the server answered with GraphQL errors.
    ///
    /// This is `None` for all failures which happened before a response could be parsed.
    pub fn graphql_response(&self) -> Option<&GraphQlResponse> {
        match self {
            ClientError::GraphQl(response) => Some(response),
            _ => None,
        }
    }
}
