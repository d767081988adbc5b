//! Configuration for the user-pool protocol client.

use crate::Result;
use dck_core::Error;
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default request timeout (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
/// Default page size for listing calls (the service caps pages at 60).
pub const DEFAULT_PAGE_SIZE: u8 = 60;

/// Configuration for connecting to a user-pool service endpoint.
///
/// Region and endpoint are supplied externally; the crate reads no environment
/// variables itself. Request signing is delegated to the deployment boundary:
/// the optional authorization value is forwarded verbatim when present.
#[derive(Debug, Clone, Validate)]
pub struct CognitoConfig {
    #[validate(url)]
    endpoint: String,
    region: String,
    authorization: Option<SecretString>,
    tls_verify: bool,
    tls_ca_cert: Option<PathBuf>,
    #[validate(range(min = 1, max = 300))]
    request_timeout_secs: u64,
    #[validate(range(min = 1, max = 60))]
    page_size: u8,
}

impl CognitoConfig {
    /// Creates a new configuration for the given endpoint and region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the endpoint URL is invalid.
    pub fn new(endpoint: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        let config = Self {
            endpoint: endpoint.into(),
            region: region.into(),
            authorization: None,
            tls_verify: true,
            tls_ca_cert: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|err| Error::ConfigError(format!("Invalid configuration: {err}")))
    }

    /// Returns the service endpoint URL string.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parses and validates the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_endpoint(&self) -> Result<Url> {
        Url::parse(&self.endpoint)
            .map_err(|err| Error::ConfigError(format!("Invalid endpoint URL: {err}")))
    }

    /// Returns the configured region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the authorization value forwarded with each request, if any.
    #[must_use]
    pub const fn authorization(&self) -> Option<&SecretString> {
        self.authorization.as_ref()
    }

    /// Returns whether TLS certificate verification is enabled.
    #[must_use]
    pub const fn tls_verify(&self) -> bool {
        self.tls_verify
    }

    /// Optional custom CA certificate path.
    #[must_use]
    pub fn tls_ca_cert(&self) -> Option<&PathBuf> {
        self.tls_ca_cert.as_ref()
    }

    /// Returns the request timeout duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the page size used for listing calls.
    #[must_use]
    pub const fn page_size(&self) -> u8 {
        self.page_size
    }

    /// Sets the authorization value forwarded with each request.
    #[must_use]
    pub fn with_authorization(mut self, authorization: SecretString) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Enables or disables TLS certificate verification.
    #[must_use]
    pub const fn with_tls_verification(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Sets the custom CA certificate path for TLS verification.
    #[must_use]
    pub fn with_tls_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Overrides the request timeout in seconds.
    #[must_use]
    pub const fn with_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Overrides the page size used for listing calls.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = CognitoConfig::new("https://cognito-idp.us-east-1.amazonaws.com", "us-east-1")
            .unwrap();
        assert_eq!(config.region(), "us-east-1");
        assert!(config.tls_verify());
        assert!(config.authorization().is_none());
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn config_rejects_invalid_endpoint() {
        let result = CognitoConfig::new("not-a-url", "us-east-1");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn builder_overrides() {
        let config = CognitoConfig::new("https://idp.example.com", "eu-west-1")
            .unwrap()
            .with_authorization(SecretString::from("Bearer test-token"))
            .with_tls_verification(false)
            .with_request_timeout_secs(45)
            .with_page_size(10);

        assert!(config.authorization().is_some());
        assert!(!config.tls_verify());
        assert_eq!(config.request_timeout(), Duration::from_secs(45));
        assert_eq!(config.page_size(), 10);
    }

    #[test]
    fn parse_endpoint_roundtrip() {
        let config = CognitoConfig::new("https://idp.example.com:8443", "eu-west-1").unwrap();
        let url = config.parse_endpoint().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("idp.example.com"));
        assert_eq!(url.port(), Some(8443));
    }
}
