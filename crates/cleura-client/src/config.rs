//! Client configuration.
//!
//! Values come from the provider block when set, otherwise from the
//! `CLEURA_*` environment variables. The resolved [`ClientConfig`] is
//! immutable and shared by every component for the lifetime of the client.

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Environment variable for the API login.
pub const ENV_USER: &str = "CLEURA_USER";
/// Environment variable for the API password.
pub const ENV_PASSWORD: &str = "CLEURA_PW";
/// Environment variable for the API base URL.
pub const ENV_URL: &str = "CLEURA_URL";
/// Environment variable for the domain id used by project-scoped accounts.
pub const ENV_DOMAIN_ID: &str = "CLEURA_DOMAIN_ID";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Explicit provider settings as supplied by the host. `None` means the
/// attribute was not set and the environment fallback applies.
#[derive(Clone, Default)]
pub struct ProviderSettings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_url: Option<String>,
    pub domain_id: Option<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("domain_id", &self.domain_id)
            .finish()
    }
}

/// Resolved, validated client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing slash.
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub domain_id: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("domain_id", &self.domain_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Build a configuration from explicit values.
    pub fn new(
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        domain_id: impl Into<String>,
    ) -> ClientResult<Self> {
        let settings = ProviderSettings {
            username: Some(username.into()),
            password: Some(password.into()),
            api_url: Some(api_url.into()),
            domain_id: Some(domain_id.into()),
        };
        Self::resolve_with(&settings, |_| None)
    }

    /// Resolve settings against the process environment.
    pub fn resolve(settings: &ProviderSettings) -> ClientResult<Self> {
        Self::resolve_with(settings, |key| std::env::var(key).ok())
    }

    /// Resolve settings using `lookup` as the environment source.
    ///
    /// Explicit settings win over the environment. Every missing or empty
    /// attribute is reported in a single error.
    pub fn resolve_with<F>(settings: &ProviderSettings, lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: &Option<String>, env_key: &str| -> String {
            explicit
                .clone()
                .or_else(|| lookup(env_key))
                .unwrap_or_default()
        };

        let username = pick(&settings.username, ENV_USER);
        let password = pick(&settings.password, ENV_PASSWORD);
        let api_url = pick(&settings.api_url, ENV_URL);
        let domain_id = pick(&settings.domain_id, ENV_DOMAIN_ID);

        let missing: Vec<&str> = [
            ("username", &username),
            ("password", &password),
            ("api_url", &api_url),
            ("domain_id", &domain_id),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(ClientError::Config(format!(
                "missing or empty value for: {}",
                missing.join(", ")
            )));
        }

        let api_url = api_url.trim_end_matches('/').to_string();
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(ClientError::Config(format!(
                "api_url must be an http(s) URL, got '{api_url}'"
            )));
        }

        Ok(Self {
            api_url,
            username,
            password,
            domain_id,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Join an API path onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
