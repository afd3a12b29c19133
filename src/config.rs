// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::client::{ClientBuilder, HeadlessClient};
use crate::errors::ClientError;
use crate::transport::DEFAULT_TIMEOUT;

/// Prefix of environment variables overriding configuration values, e.g. `AEM_HEADLESS_TOKEN`.
const ENV_PREFIX: &str = "AEM_HEADLESS_";

/// Settings to connect to a content server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Server URI or full GraphQL endpoint URI. A URI without path uses the global endpoint.
    pub endpoint: String,

    /// User for basic authentication, used together with `password`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for basic authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Bearer token, can't be combined with basic authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Read timeout in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4502".into(),
            username: None,
            password: None,
            token: None,
            connect_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            read_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Configuration {
    /// Reads the configuration from defaults, an optional TOML file and the environment, later
    /// sources taking precedence.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Configuration::default()));

        if let Some(path) = path {
            if !path.exists() {
                bail!("Config file '{}' does not exist", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        let config = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        Ok(config)
    }

    /// Creates a client with the configured endpoint, authentication and timeouts.
    pub fn build_client(&self) -> Result<HeadlessClient, ClientError> {
        let mut builder = ClientBuilder::new();
        builder
            .endpoint(&self.endpoint)?
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))?
            .read_timeout(Duration::from_millis(self.read_timeout_ms))?;

        if let Some(username) = &self.username {
            builder.basic_auth(username, self.password.as_deref().unwrap_or_default())?;
        }

        if let Some(token) = &self.token {
            builder.token_auth(token)?;
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use figment::Jail;
    use tempfile::TempDir;

    use crate::errors::ClientError;

    use super::Configuration;

    #[test]
    fn defaults() {
        let config = Configuration::default();

        assert_eq!(config.endpoint, "http://localhost:4502");
        assert_eq!(config.connect_timeout_ms, 15000);
        assert_eq!(config.read_timeout_ms, 15000);
        assert!(config.token.is_none());
    }

    #[test]
    fn load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "config.toml",
                r#"
                endpoint = "https://publish.example.com"
                token = "secret"
                read_timeout_ms = 3000
                "#,
            )?;

            let config = Configuration::load(Some(Path::new("config.toml"))).unwrap();

            assert_eq!(config.endpoint, "https://publish.example.com");
            assert_eq!(config.token.as_deref(), Some("secret"));
            assert_eq!(config.read_timeout_ms, 3000);
            assert_eq!(config.connect_timeout_ms, 15000);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_toml_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "config.toml",
                r#"
                token = "file"
                read_timeout_ms = 3000
                "#,
            )?;
            jail.set_env("AEM_HEADLESS_TOKEN", "env");
            jail.set_env("AEM_HEADLESS_READ_TIMEOUT_MS", 42);

            let config = Configuration::load(Some(Path::new("config.toml"))).unwrap();

            assert_eq!(config.token.as_deref(), Some("env"));
            assert_eq!(config.read_timeout_ms, 42);
            assert_eq!(config.endpoint, "http://localhost:4502");
            Ok(())
        });
    }

    #[test]
    fn missing_config_file() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("missing.toml");

        assert!(Configuration::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn build_client_with_basic_auth() {
        let config = Configuration {
            username: Some("admin".into()),
            password: Some("admin".into()),
            connect_timeout_ms: 500,
            ..Configuration::default()
        };

        let client = config.build_client().unwrap();

        assert_eq!(
            client.endpoint().as_str(),
            "http://localhost:4502/content/cq:graphql/global/endpoint.json"
        );
        assert_eq!(
            client.transport().authorization().unwrap(),
            "Basic YWRtaW46YWRtaW4="
        );
        assert_eq!(
            client.transport().connect_timeout(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn build_client_with_both_auth_kinds() {
        let config = Configuration {
            username: Some("admin".into()),
            token: Some("secret".into()),
            ..Configuration::default()
        };

        assert!(matches!(
            config.build_client(),
            Err(ClientError::AuthAlreadyConfigured)
        ));
    }
}
