// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP layer of the client.
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};
use log::{debug, trace};
use url::Url;

use crate::errors::ClientError;

const CONTENT_TYPE_JSON: &str = "application/json";

/// Timeout applied to connecting and to reading a response when nothing else was configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15000);

/// Sends a request and returns the response body.
///
/// Implementations fail with [`ClientError::UnexpectedStatus`] when the server answers with
/// another status than `expected`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `body` with `method` to `uri` and returns the response body.
    async fn execute(
        &self,
        uri: &Url,
        method: Method,
        body: Option<String>,
        expected: StatusCode,
    ) -> Result<String, ClientError>;
}

/// `Authorization` value for username and password.
pub fn basic_auth_header(username: &str, password: &str) -> Result<HeaderValue, ClientError> {
    let credentials = STANDARD.encode(format!("{}:{}", username, password));
    sensitive_header(&format!("Basic {}", credentials))
}

/// `Authorization` value for a bearer token.
pub fn token_auth_header(token: &str) -> Result<HeaderValue, ClientError> {
    sensitive_header(&format!("Bearer {}", token))
}

fn sensitive_header(value: &str) -> Result<HeaderValue, ClientError> {
    let mut header = HeaderValue::from_str(value)?;
    header.set_sensitive(true);
    Ok(header)
}

/// [`Transport`] sending JSON requests with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    authorization: Option<HeaderValue>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl HttpTransport {
    /// Creates a reqwest based transport sending `authorization` with every request.
    pub fn new(
        authorization: Option<HeaderValue>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(ClientError::HttpClient)?;

        Ok(Self {
            client,
            authorization,
            connect_timeout,
            read_timeout,
        })
    }

    /// Value of the `Authorization` header, if any.
    pub fn authorization(&self) -> Option<&HeaderValue> {
        self.authorization.as_ref()
    }

    /// Timeout for establishing the connection.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Timeout for the whole request including reading the response.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        uri: &Url,
        method: Method,
        body: Option<String>,
        expected: StatusCode,
    ) -> Result<String, ClientError> {
        debug!("Sending {} request to {}", method, uri);

        let mut request = self
            .client
            .request(method.clone(), uri.clone())
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON);

        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization.clone());
        }

        if let Some(body) = body {
            trace!("Request body: {}", body);
            request = request.body(body);
        }

        let request_error = |source| ClientError::Request {
            method: method.clone(),
            uri: uri.to_string(),
            source,
        };

        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        let text = response.text().await.map_err(request_error)?;

        trace!("Response {} from {}: {}", status, uri, text);

        if status != expected {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use url::Url;
    use wiremock::matchers::{body_string, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::errors::ClientError;

    use super::{basic_auth_header, token_auth_header, HttpTransport, Transport, DEFAULT_TIMEOUT};

    fn transport(authorization: Option<http::HeaderValue>) -> HttpTransport {
        HttpTransport::new(authorization, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT).unwrap()
    }

    fn uri(server: &MockServer, endpoint: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), endpoint)).unwrap()
    }

    #[test]
    fn auth_headers() {
        assert_eq!(
            basic_auth_header("user", "pw").unwrap(),
            "Basic dXNlcjpwdw=="
        );
        assert_eq!(token_auth_header("token").unwrap(), "Bearer token");
        assert!(token_auth_header("token").unwrap().is_sensitive());
    }

    #[test]
    fn invalid_header_value() {
        assert!(matches!(
            token_auth_header("bad\ntoken"),
            Err(ClientError::InvalidHeader(_))
        ));
    }

    #[tokio::test]
    async fn sends_json_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("Accept", "application/json"))
            .and(header("Content-Type", "application/json"))
            .and(body_string(r#"{"query":"{}"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport(None)
            .execute(
                &uri(&server, "/graphql"),
                Method::POST,
                Some(r#"{"query":"{}"}"#.to_string()),
                StatusCode::OK,
            )
            .await
            .unwrap();

        assert_eq!(body, r#"{"data":{}}"#);
    }

    #[tokio::test]
    async fn sends_authorization() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("Authorization", "Basic dXNlcjpwdw=="))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(Some(basic_auth_header("user", "pw").unwrap()));
        let result = transport
            .execute(&uri(&server, "/list"), Method::GET, None, StatusCode::OK)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn omits_authorization_when_unset() {
        let server = MockServer::start().await;

        Mock::given(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let result = transport(None)
            .execute(&uri(&server, "/list"), Method::GET, None, StatusCode::OK)
            .await;

        assert_eq!(result.unwrap(), "{}");
    }

    #[tokio::test]
    async fn unexpected_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let result = transport(None)
            .execute(
                &uri(&server, "/graphql"),
                Method::POST,
                Some("{}".to_string()),
                StatusCode::OK,
            )
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            &err,
            ClientError::UnexpectedStatus { status: 404, body } if body == "Not Found"
        ));
        assert_eq!(err.to_string(), "Unexpected http response code 404: Not Found");
    }

    #[tokio::test]
    async fn expects_created_on_put() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let result = transport(None)
            .execute(
                &uri(&server, "/graphql/persist.json/proj/query"),
                Method::PUT,
                Some("{ query }".to_string()),
                StatusCode::CREATED,
            )
            .await;

        assert!(matches!(
            result,
            Err(ClientError::UnexpectedStatus { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn connection_failure() {
        let uri = Url::parse("http://127.0.0.1:1/graphql").unwrap();
        let result = transport(None)
            .execute(&uri, Method::GET, None, StatusCode::OK)
            .await;

        assert!(matches!(
            result,
            Err(ClientError::Request { method, .. }) if method == Method::GET
        ));
    }
}
