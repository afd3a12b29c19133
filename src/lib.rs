// SPDX-License-Identifier: AGPL-3.0-or-later

//! # aem-headless
//!
//! Builds GraphQL queries for content fragment models, runs them against the headless API of a
//! content server and unwraps the returned items.
//!
//! ```no_run
//! # async fn run() -> Result<(), aem_headless::ClientError> {
//! use aem_headless::{HeadlessClient, Query};
//!
//! let client = HeadlessClient::builder()
//!     .endpoint("http://localhost:4502")?
//!     .basic_auth("admin", "admin")?
//!     .build()?;
//!
//! let query = Query::builder()
//!     .content_fragment_model_name("adventure")
//!     .field("title")
//!     .paginated()
//!     .build()?;
//!
//! let mut cursor = client.create_paging_cursor(&query, 10);
//! while cursor.has_next().await? {
//!     let page = cursor.next().await?;
//!     println!("{}", page);
//! }
//! # Ok(())
//! # }
//! ```
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

mod client;
mod config;
mod cursor;
mod errors;
mod persisted;
pub mod query;
mod response;
mod transport;

#[cfg(test)]
mod test_helpers;

pub use crate::client::{ClientBuilder, HeadlessClient};
pub use crate::config::Configuration;
pub use crate::cursor::PagingCursor;
pub use crate::errors::{ClientError, QueryError};
pub use crate::persisted::{validate_persisted_query_path, PersistedQuery};
pub use crate::query::{Query, QueryBuilder, QueryVariables};
pub use crate::response::{GraphQlError, GraphQlResponse};
pub use crate::transport::{
    basic_auth_header, token_auth_header, HttpTransport, Transport, DEFAULT_TIMEOUT,
};
