//! Provider configuration
//!
//! Values are resolved with the following precedence:
//! 1. Explicit provider configuration
//! 2. Environment variables (`WARREN_API_TOKEN`, `WARREN_API_URL`, `WARREN_API_LOCATION`)
//! 3. Built-in default endpoint
//!
//! A location slug may also be embedded as the last path segment of the API
//! URL (`https://api.example.com/v1/tll`).

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use warren_cloud::CloudError;

pub const DEFAULT_API_URL: &str = "https://api.equinix.warren.io/v1";
pub const ENV_API_TOKEN: &str = "WARREN_API_TOKEN";
pub const ENV_API_URL: &str = "WARREN_API_URL";
pub const ENV_API_LOCATION: &str = "WARREN_API_LOCATION";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider configuration block as supplied by the orchestrator
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Token for the Warren platform API
    #[serde(default)]
    pub api_token: Option<String>,

    /// URL of the Warren platform API, optionally ending in a location slug
    #[serde(default)]
    pub api_url: Option<String>,

    /// Location slug; overrides one embedded in the URL
    #[serde(default)]
    pub location: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("location", &self.location)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Fully resolved client construction input
#[derive(Clone)]
pub struct ClientSettings {
    pub api_url: String,
    pub api_token: String,
    pub location: Option<String>,
    pub timeout: Duration,
    /// Whether the URL came from explicit configuration
    pub explicit_url: bool,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("location", &self.location)
            .field("timeout", &self.timeout)
            .field("explicit_url", &self.explicit_url)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: Some(api_token.into()),
            ..Default::default()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Resolve the configuration against the environment
    pub fn resolve(&self) -> Result<ClientSettings, CloudError> {
        let api_token = non_empty(self.api_token.clone())
            .or_else(|| env_var(ENV_API_TOKEN))
            .ok_or_else(|| {
                CloudError::InvalidConfig(format!(
                    "API token is missing: set api_token or {}",
                    ENV_API_TOKEN
                ))
            })?;

        let explicit_url = non_empty(self.api_url.clone());
        let is_explicit = explicit_url.is_some();
        let raw_url = explicit_url
            .or_else(|| env_var(ENV_API_URL))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let (api_url, url_location) = split_location(&raw_url)?;

        let location = non_empty(self.location.clone())
            .or(url_location)
            .or_else(|| env_var(ENV_API_LOCATION));

        Ok(ClientSettings {
            api_url,
            api_token,
            location,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            explicit_url: is_explicit,
        })
    }
}

/// Split a trailing location slug off an API URL
///
/// `https://host/v1` has no slug; `https://host/v1/tll` yields
/// (`https://host/v1`, `tll`).
pub fn split_location(raw_url: &str) -> Result<(String, Option<String>), CloudError> {
    let mut url = Url::parse(raw_url.trim_end_matches('/'))
        .map_err(|e| CloudError::InvalidConfig(format!("invalid API URL {}: {}", raw_url, e)))?;

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let location = if segments.len() >= 2 {
        let (slug, rest) = segments.split_last().map(|(s, r)| (s.clone(), r.join("/"))).unwrap_or_default();
        url.set_path(&rest);
        Some(slug)
    } else {
        None
    };

    Ok((url.as_str().trim_end_matches('/').to_string(), location))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_var(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}
