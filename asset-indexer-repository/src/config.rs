//! Connection settings for the search engine client.

use std::time::Duration;

/// Default search engine URL.
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Default timeout applied to every request made by the client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for connecting to the search engine.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server URL (e.g. `https://search.example.com:443`).
    pub url: String,
    /// Encoded API key, sent as `Authorization: ApiKey <key>`.
    /// Takes precedence over basic credentials.
    pub api_key: Option<String>,
    /// Basic auth user name.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Skip TLS certificate validation. Only for local testing.
    pub accept_invalid_certs: bool,
    /// Timeout applied to the transport as a whole.
    pub request_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: None,
            username: None,
            password: None,
            accept_invalid_certs: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Create a config for the given URL with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Authenticate with an encoded API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Authenticate with basic credentials.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Basic credentials, if both parts are present.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(!config.accept_invalid_certs);
        assert!(config.basic_auth().is_none());
    }

    #[test]
    fn test_basic_auth_requires_both_parts() {
        let mut config = ConnectionConfig::new("http://localhost:9200");
        config.username = Some("admin".to_string());
        assert!(config.basic_auth().is_none());

        let config = config.with_basic_auth("admin", "secret");
        assert_eq!(config.basic_auth(), Some(("admin", "secret")));
    }
}
