//! Warren platform REST client
//!
//! Every request is resolved against `{base}/v1/{location}{path}` and carries
//! the API key in the `apikey` header. Any status >= 300 is a failure and is
//! turned into a typed [`ApiError`] that keeps the numeric status.

use crate::api::{DiskApi, FloatingIpApi, LocationApi, NetworkApi, VirtualMachineApi};
use crate::config::ClientSettings;
use crate::error::{ApiError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const API_VERSION_SEGMENT: &str = "/v1";
const API_KEY_HEADER: &str = "apikey";
const CORRELATION_ID_HEADER: &str = "X-Warren-Correlation-Id";
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Authenticated client for one API endpoint and default location
#[derive(Clone)]
pub struct WarrenClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: String,
    location: Option<String>,
}

impl std::fmt::Debug for WarrenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarrenClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"<redacted>")
            .field("location", &self.location)
            .finish()
    }
}

/// Builder for [`WarrenClient`]
#[derive(Default)]
pub struct ClientBuilder {
    api_url: Option<String>,
    api_token: Option<String>,
    location_slug: Option<String>,
    timeout: Option<Duration>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    pub fn location_slug(mut self, slug: impl Into<String>) -> Self {
        self.location_slug = Some(slug.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a preconfigured HTTP client (the timeout setting is then ignored)
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<WarrenClient> {
        let api_url = self
            .api_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::Url("API URL must not be empty".to_string()))?;
        let base_url = Url::parse(&api_url).map_err(|e| ApiError::Url(format!("{}: {}", api_url, e)))?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(WarrenClient {
            http,
            base_url,
            api_token: self.api_token.unwrap_or_default(),
            location: self.location_slug.filter(|s| !s.is_empty()),
        })
    }
}

impl WarrenClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Build a client from resolved provider settings
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let mut builder = Self::builder()
            .api_url(&settings.api_url)
            .api_token(&settings.api_token)
            .timeout(settings.timeout);
        if let Some(location) = &settings.location {
            builder = builder.location_slug(location);
        }
        builder.build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn location_slug(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub(crate) fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Client for another location sharing this client's connection pool
    ///
    /// An empty slug, or the slug already in use, keeps the current location.
    pub fn with_location(&self, slug: &str) -> WarrenClient {
        let mut client = self.clone();
        if !slug.is_empty() && self.location.as_deref() != Some(slug) {
            client.location = Some(slug.to_string());
        }
        client
    }

    pub fn get(&self, path: impl Into<String>) -> ApiCall<'_> {
        ApiCall::new(self, Method::GET, path)
    }

    pub fn post(&self, path: impl Into<String>) -> ApiCall<'_> {
        ApiCall::new(self, Method::POST, path)
    }

    pub fn put(&self, path: impl Into<String>) -> ApiCall<'_> {
        ApiCall::new(self, Method::PUT, path)
    }

    pub fn patch(&self, path: impl Into<String>) -> ApiCall<'_> {
        ApiCall::new(self, Method::PATCH, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> ApiCall<'_> {
        ApiCall::new(self, Method::DELETE, path)
    }

    pub fn disks(&self) -> DiskApi<'_> {
        DiskApi::new(self)
    }

    pub fn networks(&self) -> NetworkApi<'_> {
        NetworkApi::new(self)
    }

    pub fn floating_ips(&self) -> FloatingIpApi<'_> {
        FloatingIpApi::new(self)
    }

    pub fn virtual_machines(&self) -> VirtualMachineApi<'_> {
        VirtualMachineApi::new(self)
    }

    pub fn locations(&self) -> LocationApi<'_> {
        LocationApi::new(self)
    }

    /// Resolve a resource path into a full request URL
    pub(crate) fn endpoint(&self, location: Option<&str>, path: &str, query: &[(String, String)]) -> Url {
        let base_path = self.base_url.path().trim_end_matches('/');
        let prefix = base_path.strip_suffix(API_VERSION_SEGMENT).unwrap_or(base_path);

        let slug = location
            .filter(|s| !s.is_empty())
            .or(self.location.as_deref());

        let full_path = match slug {
            Some(slug) => format!("{}{}/{}{}", prefix, API_VERSION_SEGMENT, slug, path),
            None => format!("{}{}{}", prefix, API_VERSION_SEGMENT, path),
        };

        let mut url = self.base_url.clone();
        url.set_path(&full_path);
        url.set_query(None);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }
}

/// A single API call under construction
///
/// Form parameters take precedence over a JSON body; a call never sends both.
pub struct ApiCall<'a> {
    client: &'a WarrenClient,
    method: Method,
    path: String,
    location: Option<String>,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    json: Option<std::result::Result<Vec<u8>, serde_json::Error>>,
}

impl<'a> ApiCall<'a> {
    fn new(client: &'a WarrenClient, method: Method, path: impl Into<String>) -> Self {
        Self {
            client,
            method,
            path: path.into(),
            location: None,
            query: Vec::new(),
            form: Vec::new(),
            json: None,
        }
    }

    /// Override the client's location for this call only
    pub fn location(mut self, slug: impl Into<String>) -> Self {
        self.location = Some(slug.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.form.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.form.push((key, value)),
        }
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.json = Some(serde_json::to_vec(body));
        self
    }

    /// Execute the call and decode the response body
    pub async fn call<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.send().await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { source })
    }

    /// Execute the call, ignoring any response body
    pub async fn call_no_content(self) -> Result<()> {
        self.send().await.map(|_| ())
    }

    async fn send(self) -> Result<Vec<u8>> {
        let url = self
            .client
            .endpoint(self.location.as_deref(), &self.path, &self.query);
        let path = url.path().to_string();

        let mut request = self
            .client
            .http
            .request(self.method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, self.client.api_token());

        if !self.form.is_empty() {
            request = request.form(&self.form);
        } else if let Some(json) = self.json {
            let bytes = json.map_err(ApiError::Encode)?;
            request = request.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        tracing::debug!("{} {} -> {}", self.method, path, status);

        let body = response.bytes().await?;

        if status >= 300 {
            return Err(error_from_body(status, &body, correlation_id));
        }

        Ok(body.to_vec())
    }
}

/// Error object returned by the platform
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, serde_json::Value>>,
}

fn error_from_body(status: u16, body: &[u8], correlation_id: Option<String>) -> ApiError {
    let text = String::from_utf8_lossy(body).into_owned();

    if text.trim().is_empty() {
        return ApiError::EmptyErrorBody {
            status,
            correlation_id,
        };
    }

    let parsed: ErrorBody = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value @ serde_json::Value::Object(_)) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(_) => {
                return ApiError::UnparseableErrorBody {
                    status,
                    body: text,
                    correlation_id,
                };
            }
        },
        _ => {
            return ApiError::UnparseableErrorBody {
                status,
                body: text,
                correlation_id,
            };
        }
    };

    let message = parsed.message.unwrap_or_default();
    let errors: BTreeMap<String, String> = parsed
        .errors
        .unwrap_or_default()
        .into_iter()
        .map(|(field, value)| match value {
            serde_json::Value::String(s) => (field, s),
            other => (field, other.to_string()),
        })
        .collect();

    if message.is_empty() && errors.is_empty() {
        return ApiError::MeaninglessErrorBody {
            status,
            body: text,
            correlation_id,
        };
    }

    ApiError::Response {
        status,
        message,
        errors,
        correlation_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str, location: Option<&str>) -> WarrenClient {
        let mut builder = WarrenClient::builder().api_url(url).api_token("secret-token");
        if let Some(location) = location {
            builder = builder.location_slug(location);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_endpoint_with_location() {
        let c = client("https://api.example.com/v1", Some("tll"));
        let url = c.endpoint(None, "/storage/disks", &[]);
        assert_eq!(url.as_str(), "https://api.example.com/v1/tll/storage/disks");
    }

    #[test]
    fn test_endpoint_per_call_override() {
        let c = client("https://api.example.com/v1", Some("tll"));
        let url = c.endpoint(Some("cyc01"), "/storage/disks", &[]);
        assert_eq!(url.as_str(), "https://api.example.com/v1/cyc01/storage/disks");

        let url = c.endpoint(Some(""), "/storage/disks", &[]);
        assert_eq!(url.as_str(), "https://api.example.com/v1/tll/storage/disks");
    }

    #[test]
    fn test_endpoint_without_location_and_version() {
        let c = client("http://127.0.0.1:8080", None);
        let url = c.endpoint(None, "/config/locations", &[]);
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v1/config/locations");
    }

    #[test]
    fn test_endpoint_query() {
        let c = client("https://api.example.com/v1", None);
        let query = vec![("uuid".to_string(), "vm-1".to_string())];
        let url = c.endpoint(None, "/user-resource/vm", &query);
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/user-resource/vm?uuid=vm-1"
        );
    }

    #[test]
    fn test_with_location() {
        let c = client("https://api.example.com/v1", Some("tll"));
        assert_eq!(c.with_location("").location_slug(), Some("tll"));
        assert_eq!(c.with_location("tll").location_slug(), Some("tll"));
        assert_eq!(c.with_location("cyc01").location_slug(), Some("cyc01"));
    }

    #[test]
    fn test_build_requires_url() {
        assert!(WarrenClient::builder().api_token("t").build().is_err());
        assert!(WarrenClient::builder().api_url("::nope").build().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let c = client("https://api.example.com/v1", None);
        assert!(!format!("{:?}", c).contains("secret-token"));
    }

    #[test]
    fn test_form_keys_are_unique() {
        let c = client("https://api.example.com/v1", None);
        let call = c.post("/x").form("uuid", "a").form("uuid", "b").form("force", "true");
        assert_eq!(
            call.form,
            vec![
                ("uuid".to_string(), "b".to_string()),
                ("force".to_string(), "true".to_string())
            ]
        );
    }

    #[test]
    fn test_error_body_classification() {
        let err = error_from_body(404, b"", None);
        assert!(matches!(err, ApiError::EmptyErrorBody { status: 404, .. }));

        let err = error_from_body(500, b"<html>oops</html>", None);
        assert!(matches!(err, ApiError::UnparseableErrorBody { status: 500, .. }));

        let err = error_from_body(400, b"[1,2]", None);
        assert!(matches!(err, ApiError::UnparseableErrorBody { .. }));

        let err = error_from_body(400, br#"{"other": true}"#, None);
        assert!(matches!(err, ApiError::MeaninglessErrorBody { .. }));

        let err = error_from_body(
            400,
            br#"{"message": "Validation failed", "errors": {"size_gb": "required", "n": 5}}"#,
            Some("req-1".to_string()),
        );
        match err {
            ApiError::Response {
                status,
                message,
                errors,
                correlation_id,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Validation failed");
                assert_eq!(errors.get("size_gb").map(String::as_str), Some("required"));
                assert_eq!(errors.get("n").map(String::as_str), Some("5"));
                assert_eq!(correlation_id.as_deref(), Some("req-1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
