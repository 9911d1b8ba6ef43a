use async_trait::async_trait;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue, RANGE};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::RangeSource;
use crate::error::{Error, Result};

/// Request options applied to every request a [`HttpRangeSource`] makes,
/// the `HEAD` probe and each ranged `GET`.
#[derive(Clone)]
pub struct HttpOptions {
    /// Extra headers, e.g. `Authorization` or `Cookie`.
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<(String, Option<String>)>,
    /// Whole-request timeout. `None` waits forever.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            basic_auth: None,
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: None,
        }
    }
}

impl fmt::Debug for HttpOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values and passwords carry credentials; only names are shown.
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HttpOptions")
            .field("headers", &header_names)
            .field("basic_auth", &self.basic_auth.as_ref().map(|(user, _)| user))
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl HttpOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn basic_auth(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.basic_auth = Some((user.into(), password));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Configuration(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Configuration(format!("invalid value for header {name}: {e}")))?;
            map.append(name, value);
        }
        Ok(map)
    }

    fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder().default_headers(self.header_map()?);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))
    }
}

/// Remote resource read with HTTP Range requests.
pub struct HttpRangeSource {
    client: Client,
    url: String,
    size: u64,
    basic_auth: Option<(String, Option<String>)>,
    transferred_bytes: AtomicU64,
}

impl HttpRangeSource {
    /// Probe `url` with a `HEAD` request.
    ///
    /// The server must report `Content-Length` and advertise
    /// `Accept-Ranges: bytes`; anything else is a configuration error.
    pub async fn connect(url: impl Into<String>, options: HttpOptions) -> Result<Self> {
        let url = url.into();
        let client = options.build_client()?;

        let resp = authorize(client.head(&url), &options.basic_auth)
            .send()
            .await
            .map_err(|e| Error::Configuration(format!("HEAD {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::Configuration(format!(
                "HEAD request failed with status: {}",
                resp.status()
            )));
        }

        let size = probe_length(resp.headers())?;
        debug!(%url, size, "remote resource supports range requests");

        Ok(Self {
            client,
            url,
            size,
            basic_auth: options.basic_auth,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Body bytes received by ranged `GET`s since `connect`.
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RangeSource for HttpRangeSource {
    async fn fetch(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        debug_assert!(start < end && end <= self.len());
        let resp = authorize(self.client.get(&self.url), &self.basic_auth)
            .header(RANGE, range_header(start, end))
            .send()
            .await?;

        if resp.status() != StatusCode::PARTIAL_CONTENT {
            return Err(Error::Network(format!(
                "HTTP request failed with status: {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes().await?;
        let expected = end - start;
        if bytes.len() as u64 != expected {
            return Err(Error::Network(format!(
                "expected {expected} bytes for range {start}..{end}, got {}",
                bytes.len()
            )));
        }

        self.transferred_bytes.fetch_add(expected, Ordering::Relaxed);
        Ok(bytes.to_vec())
    }

    fn len(&self) -> u64 {
        self.size
    }

    fn location(&self) -> &str {
        &self.url
    }
}

fn authorize(req: RequestBuilder, auth: &Option<(String, Option<String>)>) -> RequestBuilder {
    match auth {
        Some((user, password)) => req.basic_auth(user, password.as_ref()),
        None => req,
    }
}

/// Inclusive wire form of the half-open interval `[start, end)`.
fn range_header(start: u64, end: u64) -> String {
    format!("bytes={}-{}", start, end - 1)
}

/// Resolve the resource length from probe headers, requiring byte-range support.
fn probe_length(headers: &HeaderMap) -> Result<u64> {
    let size = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| Error::Configuration("server does not report content length".into()))?;

    let accept_ranges = headers
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none");

    if !accept_ranges.trim().eq_ignore_ascii_case("bytes") {
        return Err(Error::Configuration(
            "server does not accept 'Range' headers".into(),
        ));
    }

    Ok(size)
}
