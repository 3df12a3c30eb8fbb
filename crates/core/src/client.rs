//! HTTP client for the extraction service.
//!
//! The service is treated as an opaque endpoint: `POST {base}/api/extract`
//! with `{"url": ...}`. Responses are checked against an explicit wire schema
//! before they become [`ExtractionRecord`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::error::DEFAULT_SERVICE_MESSAGE;
use crate::record::{ExtractionRecord, Status};
use crate::{Result, UrlsumError};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const EXTRACT_PATH: &str = "api/extract";

/// Anything that can turn a URL into an extraction record.
///
/// [`ExtractClient`] is the network implementation; tests substitute their own.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractionRecord>;
}

/// HTTP client configuration for the extraction service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL, with or without a trailing slash.
    pub base_url: String,
    /// Request timeout in seconds. `None` waits for as long as the service takes.
    pub timeout: Option<u64>,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: format!("urlsum/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    url: &'a str,
}

/// Shape the service must return on success.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    title: String,
    summary: String,
    key_points: Vec<String>,
    url: String,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl WireRecord {
    fn into_record(self, received_at: OffsetDateTime) -> ExtractionRecord {
        match self.status {
            Some(Status::Error) => {
                let message = self.error.unwrap_or(self.summary);
                ExtractionRecord::failure(self.url, message, received_at)
            }
            _ => ExtractionRecord::success(self.title, self.summary, self.key_points, self.url, received_at),
        }
    }
}

/// Network client for the extraction endpoint.
#[derive(Debug, Clone)]
pub struct ExtractClient {
    client: Client,
    endpoint: Url,
    timeout: Option<u64>,
}

impl ExtractClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let endpoint = endpoint_for(&config.base_url)?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(UrlsumError::HttpError)?;

        Ok(Self { client, endpoint, timeout: config.timeout })
    }

    /// The fully resolved extraction endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> UrlsumError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => UrlsumError::Timeout { timeout },
            _ => UrlsumError::HttpError(err),
        }
    }
}

#[async_trait]
impl Extractor for ExtractClient {
    async fn extract(&self, url: &str) -> Result<ExtractionRecord> {
        tracing::debug!(endpoint = %self.endpoint, %url, "submitting extraction request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ExtractRequest { url })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let message = parse_error_message(&body);
            tracing::warn!(status = status.as_u16(), %message, "extraction service returned an error");
            return Err(UrlsumError::Service { status: status.as_u16(), message });
        }

        let received_at = OffsetDateTime::now_utc();
        parse_record(&body, received_at)
    }
}

/// Resolves `{base}/api/extract`, tolerating a trailing slash on the base.
pub fn endpoint_for(base_url: &str) -> Result<Url> {
    let base = base_url.trim().trim_end_matches('/');
    let endpoint = Url::parse(&format!("{}/{}", base, EXTRACT_PATH))
        .map_err(|e| UrlsumError::InvalidUrl(format!("{}: {}", base_url, e)))?;

    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(UrlsumError::InvalidUrl(format!(
            "{}: base URL must use http:// or https://",
            base_url
        )));
    }

    Ok(endpoint)
}

/// Parses a success body against the wire schema.
fn parse_record(body: &str, received_at: OffsetDateTime) -> Result<ExtractionRecord> {
    let wire: WireRecord = serde_json::from_str(body).map_err(|e| UrlsumError::InvalidResponse(e.to_string()))?;
    Ok(wire.into_record(received_at))
}

/// Pulls the `error` field out of a failure body, falling back to a generic message.
fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVICE_MESSAGE.to_string())
}
