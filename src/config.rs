//! Connected app configuration.

use std::time::Duration;

use crate::{DEFAULT_API_VERSION, DEFAULT_REDIRECT_URI, DEFAULT_TIMEOUT};

/// Static configuration for a connected app session.
///
/// The client secret is redacted in `Debug` output to prevent accidental
/// exposure in logs. Tokens supplied here (from caller-managed persistence)
/// seed the session state but do not mark it logged in; `refresh` is the
/// path back to an authorized session.
#[derive(Clone)]
pub struct AppConfig {
    /// Consumer key of the connected app (client_id).
    pub client_id: String,
    /// Consumer secret of the connected app (client_secret).
    client_secret: String,
    /// API version used when building `/services/data/v{version}/` URLs.
    pub api_version: String,
    /// Overrides both the token endpoint and the authorize endpoint when set.
    pub login_url: Option<String>,
    /// Redirect URI observed during the interactive login flow.
    pub redirect_uri: String,
    /// Security token appended to the password for the password grant.
    pub security_token: String,
    /// Per-request timeout enforced by the transport.
    pub timeout: Duration,
    /// Default Accept header for requests, when set.
    pub accept: Option<String>,
    /// Access token restored by the caller, if any.
    pub access_token: Option<String>,
    /// Refresh token restored by the caller, if any.
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("login_url", &self.login_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Create a new config for the given connected app credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            login_url: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            security_token: String::new(),
            timeout: DEFAULT_TIMEOUT,
            accept: None,
            access_token: None,
            refresh_token: None,
        }
    }

    /// Get the client secret (for grant bodies).
    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Set the API version (e.g. "62.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Override the login URL used for token and authorize endpoints.
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = Some(url.into());
        self
    }

    /// Set the redirect URI for the interactive login flow.
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }

    /// Set the security token appended to the password grant password.
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = token.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default Accept header.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Seed the session with a previously persisted access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Seed the session with a previously persisted refresh token.
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AppConfig::new("id123", "secret456")
            .with_api_version("60.0")
            .with_login_url("https://test.salesforce.com/services/oauth2/token")
            .with_redirect_uri("myapp://callback")
            .with_security_token("tok")
            .with_timeout(Duration::from_secs(10));

        assert_eq!(config.client_id, "id123");
        assert_eq!(config.client_secret(), "secret456");
        assert_eq!(config.api_version, "60.0");
        assert_eq!(config.redirect_uri, "myapp://callback");
        assert_eq!(config.security_token, "tok");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::new("id", "secret");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.login_url.is_none());
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::new("id", "super_secret_value");
        let debug_output = format!("{:?}", config);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_value"));
    }
}
