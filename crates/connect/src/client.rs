//! HTTP client for the Flipwatch share API.
//!
//! Non-2xx responses and transport failures are reported as
//! `ShareError::Api` carrying the status, message and request id the caller
//! needs; nothing is retried or translated further.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use flipwatch_core::errors::{Error, Result};
use flipwatch_core::share::{
    CreateShareRequest, CreateShareResponse, RemoteApiError, RetrieveShareResponse,
    ShareApiTrait, ShareError,
};
use flipwatch_core::watchlists::Watchlist;

/// Default timeout for API requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default base URL for the share API.
pub const DEFAULT_SHARE_API_URL: &str = "https://api.flipwatch.app";

const REQUEST_ID_HEADER: &str = "x-request-id";

// ─────────────────────────────────────────────────────────────────────────────
// API Error Body
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Share API Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the share API.
///
/// ```ignore
/// let client = ShareApiClient::new("https://api.flipwatch.app", None, DEFAULT_REQUEST_TIMEOUT)?;
/// let response = client.retrieve_share("swift-golden-dragon").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ShareApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: Option<HeaderValue>,
}

impl ShareApiClient {
    /// Create a new share API client. `access_token` is sent as a bearer token when given.
    pub fn new(base_url: &str, access_token: Option<&str>, timeout: Duration) -> Result<Self> {
        let auth_header = access_token
            .map(|token| {
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| Error::Unexpected(format!("Invalid access token format: {}", e)))
            })
            .transpose()?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(auth_header) = &self.auth_header {
            headers.insert(AUTHORIZATION, auth_header.clone());
        }
        headers
    }

    fn share_url(&self) -> String {
        format!("{}/api/v1/watchlists/share", self.base_url)
    }

    /// Parse an HTTP response, turning non-2xx statuses into `ShareError::Api`.
    async fn parse_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            debug!("[ShareApi] {} -> {}", status, body);
            return Err(api_error(status, request_id, &body).into());
        }

        serde_json::from_str(&body).map_err(|e| {
            ShareError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
        })
    }
}

#[async_trait]
impl ShareApiTrait for ShareApiClient {
    async fn create_share(&self, watchlist: &Watchlist) -> Result<CreateShareResponse> {
        let url = self.share_url();
        debug!("[ShareApi] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&CreateShareRequest { watchlist })
            .send()
            .await
            .map_err(transport_error)?;

        self.parse_response(response).await
    }

    async fn retrieve_share(&self, token: &str) -> Result<RetrieveShareResponse> {
        let url = format!("{}/{}", self.share_url(), urlencoding::encode(token));
        debug!("[ShareApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(transport_error)?;

        self.parse_response(response).await
    }
}

/// Timeouts report 504, any other transport failure 503.
fn transport_error(err: reqwest::Error) -> Error {
    let status = if err.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    ShareError::Api(RemoteApiError {
        message: format!("Request failed: {}", err),
        status: status.as_u16(),
        request_id: None,
        details: None,
    })
    .into()
}

fn api_error(status: StatusCode, request_id: Option<String>, body: &str) -> ShareError {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).unwrap_or_default();
    let message = parsed.message.or(parsed.error).unwrap_or_else(|| {
        let snippet: String = body.trim().chars().take(200).collect();
        if snippet.is_empty() {
            format!("HTTP {}", status)
        } else {
            snippet
        }
    });

    ShareError::Api(RemoteApiError {
        message,
        status: status.as_u16(),
        request_id: parsed.request_id.or(request_id),
        details: parsed.details,
    })
}
