//! HTTP fetcher backed by a shared reqwest client

use crate::config::FetchOptions;
use crate::error::{ArticleError, CollectError};
use crate::fetcher::{Fetcher, Page};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use encoding_rs::{Encoding, UTF_8};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use tracing::debug;

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
    "font/",
];

const ACCEPT_HTML: &str = "text/html, application/xhtml+xml, */*;q=0.8";

/// Build the client one batch shares
///
/// Dropping the returned client releases its connection pool.
pub fn build_client(options: &FetchOptions) -> Result<reqwest::Client, CollectError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&options.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(options.connect_timeout)
        .build()
        .map_err(CollectError::ClientBuild)
}

/// Fetcher issuing real HTTP requests
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Wrap an existing client
    pub fn new(client: reqwest::Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    /// Build a fresh client from options
    pub fn from_options(options: &FetchOptions) -> Result<Self, CollectError> {
        Ok(Self::new(build_client(options)?, options.max_body_bytes))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, url: &str) -> Result<Page, ArticleError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ArticleError::from_reqwest)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        debug!(url, status, content_type = ?content_type, "Got response");

        // Body is irrelevant for anything but 200
        if status != 200 {
            return Ok(Page::status(status));
        }

        if let Some(ref ct) = content_type {
            if is_binary_content_type(ct) {
                return Err(ArticleError::UnsupportedContentType(ct.clone()));
            }
        }

        let declared_length: Option<u64> = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        if declared_length.is_some_and(|len| len > self.max_body_bytes as u64) {
            return Err(ArticleError::BodyTooLarge(self.max_body_bytes));
        }

        let body = read_body_capped(response, self.max_body_bytes).await?;

        Ok(Page {
            status,
            body: decode_body(&body, content_type.as_deref()),
        })
    }
}

/// Decode with the `charset` of the Content-Type, UTF-8 when absent or unknown
///
/// A byte order mark wins over the declared charset.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(encoding = used.name(), "Body had undecodable bytes");
    }
    text.into_owned()
}

/// `charset` parameter of a Content-Type value
fn charset(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

/// Read the whole body, failing once it grows past `limit`
async fn read_body_capped(
    response: reqwest::Response,
    limit: usize,
) -> Result<Bytes, ArticleError> {
    let mut body = BytesMut::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ArticleError::Body(e.to_string()))?;
        if body.len() + chunk.len() > limit {
            return Err(ArticleError::BodyTooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}
