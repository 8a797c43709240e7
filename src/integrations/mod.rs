pub mod github;

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::time::Duration;

/// Name of the JSONP callback requested from the provider.
pub const JSONP_CALLBACK: &str = "taskboard_cb";

const USER_AGENT: &str = concat!("taskboard/", env!("CARGO_PKG_VERSION"));

/// Provider response wrapper: a status code next to the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub meta: Meta,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub status: u16,
    /// Rate limit and paging headers the provider mirrors into the envelope.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            meta: Meta {
                status,
                extra: Map::new(),
            },
            data,
        }
    }

    pub fn ok(data: Value) -> Self {
        Self::new(200, data)
    }

    pub fn is_success(&self) -> bool {
        self.meta.status == 200
    }

    /// Error text the provider put in the payload, if any.
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

/// Fetches one URL and hands back the provider's envelope.
///
/// Implementations report only transport problems as errors; a
/// non-success envelope is a normal return value.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Envelope>> + Send;
}

/// Transport backed by reqwest. One client per process so connections
/// to the API host are pooled across repositories.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Envelope> {
        tracing::debug!("GET {}", redact_token(url));

        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_body(status, &body)
    }
}

/// Turn a response body into an envelope.
///
/// JSONP bodies already carry the envelope. Plain JSON bodies get one
/// built from the HTTP status code.
pub fn parse_body(http_status: u16, body: &str) -> Result<Envelope> {
    if let Some(inner) = strip_jsonp(body) {
        return serde_json::from_str(inner)
            .map_err(|e| Error::transport("parsererror", e.to_string()));
    }

    let data = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(body) {
            Ok(data) => data,
            Err(e) if (200..300).contains(&http_status) => {
                return Err(Error::transport("parsererror", e.to_string()))
            }
            // Gateway and proxy error pages are HTML; keep the status instead.
            Err(_) => return Err(Error::transport("error", status_line(http_status))),
        }
    };
    Ok(Envelope::new(http_status, data))
}

fn status_line(http_status: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(http_status)
        .ok()
        .and_then(|status| status.canonical_reason());
    match reason {
        Some(reason) => format!("{} {}", http_status, reason),
        None => http_status.to_string(),
    }
}

fn strip_jsonp(body: &str) -> Option<&str> {
    let body = body.trim();
    let body = body.strip_prefix("/**/").unwrap_or(body);
    let inner = body.strip_prefix(JSONP_CALLBACK)?.trim_start().strip_prefix('(')?;
    let inner = inner.trim_end();
    let inner = inner.strip_suffix(';').unwrap_or(inner).trim_end();
    inner.strip_suffix(')')
}

/// Hide the access token when a URL goes to the log.
pub fn redact_token(url: &str) -> String {
    let Some(start) = url.find("access_token=") else {
        return url.to_string();
    };
    let value_start = start + "access_token=".len();
    let value_end = url[value_start..]
        .find('&')
        .map_or(url.len(), |i| value_start + i);
    format!("{}***{}", &url[..value_start], &url[value_end..])
}
