// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use http::HeaderValue;
use url::Url;

use crate::client::{resolve_endpoint, HeadlessClient};
use crate::errors::ClientError;
use crate::transport::{basic_auth_header, token_auth_header, HttpTransport, DEFAULT_TIMEOUT};

/// Configures a [`HeadlessClient`] talking HTTP.
///
/// The builder creates exactly one client: after [`ClientBuilder::build`] every call fails with
/// [`ClientError::BuilderReused`].
#[derive(Debug)]
pub struct ClientBuilder {
    endpoint: Option<Url>,
    authorization: Option<HeaderValue>,
    connect_timeout: Duration,
    read_timeout: Duration,
    sealed: bool,
}

impl ClientBuilder {
    /// Returns a builder with default timeouts and no authentication.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            authorization: None,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            sealed: false,
        }
    }

    fn assert_not_sealed(&self) -> Result<(), ClientError> {
        if self.sealed {
            return Err(ClientError::BuilderReused);
        }
        Ok(())
    }

    fn set_authorization(&mut self, authorization: HeaderValue) -> Result<&mut Self, ClientError> {
        if self.authorization.is_some() {
            return Err(ClientError::AuthAlreadyConfigured);
        }
        self.authorization = Some(authorization);
        Ok(self)
    }

    /// GraphQL endpoint; a URI without path uses the server's global endpoint.
    pub fn endpoint(&mut self, uri: &str) -> Result<&mut Self, ClientError> {
        self.assert_not_sealed()?;
        self.endpoint = Some(resolve_endpoint(uri)?);
        Ok(self)
    }

    /// Authenticates with username and password.
    pub fn basic_auth(&mut self, username: &str, password: &str) -> Result<&mut Self, ClientError> {
        self.assert_not_sealed()?;
        self.set_authorization(basic_auth_header(username, password)?)
    }

    /// Authenticates with a bearer token.
    pub fn token_auth(&mut self, token: &str) -> Result<&mut Self, ClientError> {
        self.assert_not_sealed()?;
        self.set_authorization(token_auth_header(token)?)
    }

    /// Timeout for establishing the connection.
    pub fn connect_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ClientError> {
        self.assert_not_sealed()?;
        self.connect_timeout = timeout;
        Ok(self)
    }

    /// Timeout for the whole request including reading the response.
    pub fn read_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ClientError> {
        self.assert_not_sealed()?;
        self.read_timeout = timeout;
        Ok(self)
    }

    /// Creates the client and seals the builder.
    pub fn build(&mut self) -> Result<HeadlessClient<HttpTransport>, ClientError> {
        self.assert_not_sealed()?;
        self.sealed = true;

        let endpoint = self.endpoint.take().ok_or(ClientError::MissingEndpoint)?;
        let transport = HttpTransport::new(
            self.authorization.take(),
            self.connect_timeout,
            self.read_timeout,
        )?;

        Ok(HeadlessClient::from_parts(endpoint, transport))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::client::HeadlessClient;
    use crate::errors::ClientError;
    use crate::transport::DEFAULT_TIMEOUT;

    use super::ClientBuilder;

    #[test]
    fn default_client() {
        let client = HeadlessClient::builder()
            .endpoint("http://localhost:4502")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            client.endpoint().as_str(),
            "http://localhost:4502/content/cq:graphql/global/endpoint.json"
        );
        assert!(client.transport().authorization().is_none());
        assert_eq!(client.transport().connect_timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.transport().read_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn basic_auth() {
        let client = HeadlessClient::builder()
            .endpoint("http://localhost:4502")
            .unwrap()
            .basic_auth("user", "pw")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            client.transport().authorization().unwrap(),
            "Basic dXNlcjpwdw=="
        );
    }

    #[test]
    fn token_auth_and_timeouts() {
        let client = HeadlessClient::builder()
            .endpoint("http://localhost:4502/custom/endpoint.json")
            .unwrap()
            .token_auth("token")
            .unwrap()
            .connect_timeout(Duration::from_millis(1000))
            .unwrap()
            .read_timeout(Duration::from_millis(2000))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            client.endpoint().as_str(),
            "http://localhost:4502/custom/endpoint.json"
        );
        assert_eq!(client.transport().authorization().unwrap(), "Bearer token");
        assert_eq!(
            client.transport().connect_timeout(),
            Duration::from_millis(1000)
        );
        assert_eq!(
            client.transport().read_timeout(),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn auth_configured_twice() {
        let mut builder = ClientBuilder::new();
        builder.basic_auth("user", "pw").unwrap();

        let err = builder.token_auth("token").unwrap_err();
        assert!(matches!(err, ClientError::AuthAlreadyConfigured));
        assert_eq!(err.to_string(), "Authentication is already configured");
    }

    #[test]
    fn build_twice() {
        let mut builder = ClientBuilder::new();
        builder.endpoint("http://localhost:4502").unwrap();
        assert!(builder.build().is_ok());

        assert!(matches!(builder.build(), Err(ClientError::BuilderReused)));
        assert!(matches!(
            builder.endpoint("http://localhost:4503"),
            Err(ClientError::BuilderReused)
        ));
        assert!(matches!(
            builder.token_auth("token"),
            Err(ClientError::BuilderReused)
        ));
    }

    #[test]
    fn missing_endpoint() {
        assert!(matches!(
            ClientBuilder::new().build(),
            Err(ClientError::MissingEndpoint)
        ));
    }

    #[test]
    fn invalid_endpoint() {
        assert!(matches!(
            ClientBuilder::new().endpoint("::"),
            Err(ClientError::InvalidUri { .. })
        ));
    }
}
