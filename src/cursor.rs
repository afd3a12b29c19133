// SPDX-License-Identifier: AGPL-3.0-or-later

//! Cursor based paging through large result sets.
use async_stream::try_stream;
use futures::Stream;
use serde_json::Value;

use crate::client::HeadlessClient;
use crate::errors::ClientError;
use crate::query::QueryVariables;
use crate::response::GraphQlResponse;
use crate::transport::Transport;

const JSON_KEY_HAS_NEXT_PAGE: &str = "hasNextPage";
const JSON_KEY_END_CURSOR: &str = "endCursor";

/// What the cursor executes for every page.
#[derive(Debug, Clone)]
enum PagedQuery {
    /// Query text sent to the GraphQL endpoint.
    Inline(String),

    /// Short path of a persisted query.
    Persisted(String),
}

#[derive(Debug)]
enum State {
    /// Nothing was fetched yet.
    Unstarted,

    /// A page was fetched by `has_next` and is waiting to be returned by `next`.
    Lookahead(Box<GraphQlResponse>),

    /// All fetched pages were returned.
    Streaming,
}

/// Fetches the pages of a cursor paginated query one after another.
///
/// Every page is requested with the variables the cursor was created with plus `first` set to
/// the page size and `after` set to the end cursor of the previous page (`null` for the first
/// page). The query has to select `pageInfo { hasNextPage endCursor }`.
///
/// ```text
/// while cursor.has_next().await? {
///     let page = cursor.next().await?;
/// }
/// ```
#[derive(Debug)]
pub struct PagingCursor<'a, T: Transport> {
    client: &'a HeadlessClient<T>,
    query: PagedQuery,
    page_size: u32,
    variables: QueryVariables,
    state: State,
    has_more: bool,
    end_cursor: Option<String>,
}

impl<'a, T: Transport> PagingCursor<'a, T> {
    fn new(
        client: &'a HeadlessClient<T>,
        query: PagedQuery,
        page_size: u32,
        variables: QueryVariables,
    ) -> Self {
        Self {
            client,
            query,
            page_size,
            variables,
            state: State::Unstarted,
            has_more: false,
            end_cursor: None,
        }
    }

    pub(crate) fn for_query(
        client: &'a HeadlessClient<T>,
        query: String,
        page_size: u32,
        variables: QueryVariables,
    ) -> Self {
        Self::new(client, PagedQuery::Inline(query), page_size, variables)
    }

    pub(crate) fn for_persisted_query(
        client: &'a HeadlessClient<T>,
        short_path: String,
        page_size: u32,
        variables: QueryVariables,
    ) -> Self {
        Self::new(client, PagedQuery::Persisted(short_path), page_size, variables)
    }

    /// Number of items requested per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns true if another page is available.
    ///
    /// The first call, and any call after a page was returned while the server reported more
    /// pages, fetches that page ahead. Repeated calls don't fetch again.
    pub async fn has_next(&mut self) -> Result<bool, ClientError> {
        match self.state {
            State::Lookahead(_) => Ok(true),
            State::Unstarted => self.fetch_ahead().await,
            State::Streaming if self.has_more => self.fetch_ahead().await,
            State::Streaming => Ok(false),
        }
    }

    /// Returns the next page.
    ///
    /// Fails with [`ClientError::NoMoreResults`] when the last page was already returned.
    pub async fn next(&mut self) -> Result<GraphQlResponse, ClientError> {
        match std::mem::replace(&mut self.state, State::Streaming) {
            State::Lookahead(page) => Ok(*page),
            State::Unstarted => {
                let page = self.fetch().await;
                if page.is_err() {
                    self.state = State::Unstarted;
                }
                page
            }
            State::Streaming if self.has_more => self.fetch().await,
            State::Streaming => Err(ClientError::NoMoreResults),
        }
    }

    /// Turns the cursor into a stream of all remaining pages.
    ///
    /// The stream ends after the last page or with the first error.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<GraphQlResponse, ClientError>> + 'a
    where
        T: 'a,
    {
        try_stream! {
            while self.has_next().await? {
                let page = self.next().await?;
                yield page;
            }
        }
    }

    async fn fetch_ahead(&mut self) -> Result<bool, ClientError> {
        let page = self.fetch().await?;
        self.state = State::Lookahead(Box::new(page));
        Ok(true)
    }

    async fn fetch(&mut self) -> Result<GraphQlResponse, ClientError> {
        let mut variables = self.variables.clone();
        variables
            .first(self.page_size)
            .after(self.end_cursor.as_deref());

        let response = match &self.query {
            PagedQuery::Inline(query) => self.client.run_query_with_vars(query, &variables).await?,
            PagedQuery::Persisted(short_path) => {
                self.client
                    .run_persisted_query(short_path, Some(&variables))
                    .await?
            }
        };

        let page_info = response.page_info().ok_or_else(|| {
            let data = response
                .data()
                .map_or_else(|| "null".to_string(), Value::to_string);
            ClientError::MissingPageInfo(data)
        })?;

        self.has_more = page_info
            .get(JSON_KEY_HAS_NEXT_PAGE)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        self.end_cursor = page_info
            .get(JSON_KEY_END_CURSOR)
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(response)
    }
}
