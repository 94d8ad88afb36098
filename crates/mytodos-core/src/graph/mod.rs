//! Graph API client used to read the authenticated principal's profile.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::util::is_http_url;

const GRAPH_HTTP_TIMEOUT_SECS: u64 = 10;
const ERROR_BODY_LIMIT: usize = 180;

/// Fields requested for `/me` by the login screen.
pub const PROFILE_FIELDS: [&str; 5] = ["name", "first_name", "last_name", "birthday", "email"];

/// Profile of the authenticated principal as returned by `/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    /// `None` when the field is absent, `Some(None)` when it is `null`.
    #[serde(default, deserialize_with = "present_field")]
    pub email: Option<Option<String>>,
}

impl GraphProfile {
    /// Whether the response carried an `email` field at all.
    pub const fn has_email_field(&self) -> bool {
        self.email.is_some()
    }
}

fn present_field<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Outcome of a profile request, delivered exactly once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileFetchResult {
    Profile(GraphProfile),
    Error(String),
    Cancelled,
}

/// Requests a field selection for the principal owning `token`.
#[allow(async_fn_in_trait)]
pub trait ProfileFetcher {
    async fn fetch_profile(&self, token: &str, fields: &[&str]) -> ProfileFetchResult;
}

/// HTTP client for a Facebook-style Graph API.
#[derive(Debug, Clone)]
pub struct GraphClient {
    base_url: String,
    client: Client,
}

impl GraphClient {
    /// Build a client for `{url}/{version}`.
    pub fn new(url: impl AsRef<str>, version: impl AsRef<str>) -> Result<Self> {
        let base_url = normalize_graph_url(url.as_ref(), version.as_ref())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(GRAPH_HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve the profile picture URL without following the image redirect.
    pub async fn fetch_picture_url(&self, token: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/me/picture", self.base_url))
            .bearer_auth(token)
            .query(&[("type", "large"), ("redirect", "false")])
            .send()
            .await
            .map_err(|error| Error::Http(error.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| Error::Http(error.without_url()))?;
        parse_picture_response(status, &body)
    }
}

impl ProfileFetcher for GraphClient {
    async fn fetch_profile(&self, token: &str, fields: &[&str]) -> ProfileFetchResult {
        let fields = fields.join(",");
        tracing::debug!("Requesting /me fields: {}", fields);

        let response = match self
            .client
            .get(format!("{}/me", self.base_url))
            .bearer_auth(token)
            .query(&[("fields", fields.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => return ProfileFetchResult::Error(error.without_url().to_string()),
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => parse_profile_response(status, &body),
            Err(error) => ProfileFetchResult::Error(error.without_url().to_string()),
        }
    }
}

/// Build the versioned API root, e.g. `https://graph.facebook.com/v19.0`.
pub fn normalize_graph_url(url: &str, version: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("Graph API URL must not be empty".to_string()));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Config(
            "Graph API URL must include http:// or https://".to_string(),
        ));
    }

    let version = version.trim().trim_matches('/');
    if version.is_empty() || trimmed.ends_with(&format!("/{version}")) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/{version}"))
    }
}

/// Classify a `/me` response body.
pub fn parse_profile_response(status: StatusCode, body: &str) -> ProfileFetchResult {
    if !status.is_success() {
        return ProfileFetchResult::Error(parse_api_error(status, body));
    }

    let envelope = match serde_json::from_str::<ProfileEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(error) => return ProfileFetchResult::Error(format!("invalid profile payload: {error}")),
    };

    if let Some(error) = envelope.error {
        return ProfileFetchResult::Error(error.describe());
    }
    if envelope.is_cancelled {
        return ProfileFetchResult::Cancelled;
    }

    match serde_json::from_str::<GraphProfile>(body) {
        Ok(profile) => ProfileFetchResult::Profile(profile),
        Err(error) => ProfileFetchResult::Error(format!("invalid profile payload: {error}")),
    }
}

/// Extract the picture URL from a `/me/picture?redirect=false` body.
pub fn parse_picture_response(status: StatusCode, body: &str) -> Result<Option<String>> {
    if !status.is_success() {
        return Err(Error::Provider(parse_api_error(status, body)));
    }

    let payload = serde_json::from_str::<PictureResponse>(body)?;
    Ok(payload.data.and_then(|data| data.url))
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    #[serde(default, rename = "isCancelled")]
    is_cancelled: bool,
    #[serde(default)]
    error: Option<GraphApiError>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: Option<GraphApiError>,
}

#[derive(Debug, Deserialize)]
struct GraphApiError {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<i64>,
}

impl GraphApiError {
    fn describe(&self) -> String {
        let message = self
            .message
            .as_deref()
            .map_or("unknown Graph API error", str::trim);
        match (&self.kind, self.code) {
            (Some(kind), Some(code)) => format!("{message} ({kind} {code})"),
            (Some(kind), None) => format!("{message} ({kind})"),
            (None, Some(code)) => format!("{message} ({code})"),
            (None, None) => message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PictureResponse {
    data: Option<PictureData>,
}

#[derive(Debug, Deserialize)]
struct PictureData {
    url: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(GraphErrorResponse { error: Some(error) }) =
        serde_json::from_str::<GraphErrorResponse>(body)
    {
        return format!("{} [HTTP {}]", error.describe(), status.as_u16());
    }

    let trimmed: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} (HTTP {})", trimmed, status.as_u16())
    }
}
