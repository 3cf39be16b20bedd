//! API client configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::ApiError;

/// Public endpoint used when no URL is configured.
pub const DEFAULT_API_URL: &str = "https://api.rosette.com/rest/v1/";

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "ROSETTE_API_KEY";

/// Environment variable consulted when no URL is configured.
pub const API_URL_ENV: &str = "ROSETTE_API_URL";

/// Configuration for the text analytics API client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Base URL of the service (defaults to the public endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Custom application identifier header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_header: Option<String>,
    /// Maximum number of requests in flight across all callers
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Maximum idle pooled connections kept per destination
    #[serde(default = "default_max_connections_per_host")]
    pub max_connections_per_host: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> usize {
    20
}

fn default_max_connections_per_host() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            url: None,
            app_header: None,
            max_connections: default_max_connections(),
            max_connections_per_host: default_max_connections_per_host(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Fill unset values from the environment.
    ///
    /// Supported env vars:
    /// - `ROSETTE_API_KEY`: API key
    /// - `ROSETTE_API_URL`: alternative base URL (self-hosted deployments)
    ///
    /// Explicit configuration always wins; env vars only fill blanks.
    pub fn with_env_fallbacks(self) -> Self {
        self.with_fallbacks(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(API_URL_ENV).ok(),
        )
    }

    /// Fill an unset key or URL from the given values.
    fn with_fallbacks(mut self, key: Option<String>, url: Option<String>) -> Self {
        if non_empty(self.key.as_deref()).is_none() {
            self.key = key.filter(|k| !k.trim().is_empty());
        }
        if non_empty(self.url.as_deref()).is_none() {
            self.url = url.filter(|u| !u.trim().is_empty());
        }
        self
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// The configured key, if non-empty.
    pub fn api_key(&self) -> Option<&str> {
        non_empty(self.key.as_deref())
    }

    /// Whether requests go to the public endpoint.
    pub fn uses_default_url(&self) -> bool {
        match non_empty(self.url.as_deref()) {
            None => true,
            Some(url) => url
                .trim_end_matches('/')
                .eq_ignore_ascii_case(DEFAULT_API_URL.trim_end_matches('/')),
        }
    }

    /// Parse the base URL, normalized to end with `/` so operation paths join under it.
    pub fn base_url(&self) -> Result<Url, ApiError> {
        let raw = non_empty(self.url.as_deref()).unwrap_or(DEFAULT_API_URL);
        let mut normalized = raw.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let url = Url::parse(&normalized)
            .map_err(|e| ApiError::Config(format!("invalid API URL `{}`: {}", raw, e)))?;
        if url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "API URL `{}` cannot be used as a base URL",
                raw
            )));
        }
        Ok(url)
    }

    /// Check the settings required to start a client.
    ///
    /// The public endpoint cannot be used without a key; self-hosted
    /// endpoints may run unauthenticated.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.uses_default_url() && self.api_key().is_none() {
            return Err(ApiError::Config(format!(
                "an API key is required, set `api.key` in the configuration or the {} environment variable",
                API_KEY_ENV
            )));
        }
        if self.max_connections == 0 {
            return Err(ApiError::Config(
                "`api.max_connections` must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
