// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::{Method, StatusCode};
use url::Url;

use crate::client::HeadlessClient;
use crate::errors::ClientError;
use crate::transport::Transport;

pub(crate) const TEST_ENDPOINT: &str = "http://localhost:4502";

/// Request as seen by the [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub uri: String,
    pub method: Method,
    pub body: Option<String>,
    pub expected: StatusCode,
}

/// Transport answering with queued responses and recording every request it receives.
///
/// Clones share their queue and recordings, so a clone can be kept to inspect what a client
/// sent.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<String, (u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response body.
    pub(crate) fn respond_with(&self, body: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.to_string()));
        self
    }

    /// Queues a response with an unexpected status code.
    pub(crate) fn fail_with(&self, status: u16, body: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err((status, body.to_string())));
        self
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_bodies(&self) -> Vec<serde_json::Value> {
        self.requests()
            .iter()
            .filter_map(|request| request.body.as_ref())
            .map(|body| serde_json::from_str(body).unwrap())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(
        &self,
        uri: &Url,
        method: Method,
        body: Option<String>,
        expected: StatusCode,
    ) -> Result<String, ClientError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            uri: uri.to_string(),
            method,
            body,
            expected,
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err((status, body))) => Err(ClientError::UnexpectedStatus { status, body }),
            None => panic!("No response queued for request to {}", uri),
        }
    }
}

/// Client talking to the default test endpoint through the given mock.
pub(crate) fn mock_client(transport: &MockTransport) -> HeadlessClient<MockTransport> {
    HeadlessClient::with_transport(TEST_ENDPOINT, transport.clone()).unwrap()
}
