//! Error types for Clean

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching and extracting a single article
///
/// These never cross the task boundary: the article task turns them into a
/// failed [`ArticleResult`](crate::ArticleResult) using their `Display` text.
#[derive(Debug, Error)]
pub enum ArticleError {
    /// Target answered with something other than 200
    #[error("Got status {0}")]
    Status(u16),

    /// The task did not finish within its deadline
    #[error("Timed out after {} seconds", .0.as_secs_f64())]
    Timeout(Duration),

    /// Failed to connect to server
    #[error("Failed to connect to server: {0}")]
    Connect(String),

    /// Other request error (invalid URL, TLS, redirect loop, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// Reading the response body failed midway
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Response body is larger than the configured cap
    #[error("Response body exceeds {0} bytes")]
    BodyTooLarge(usize),

    /// Response is not something we can parse as a page
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Extractor rejected the document
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Extraction worker panicked or was cancelled
    #[error("Extraction worker failed: {0}")]
    Worker(String),
}

impl ArticleError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ArticleError::Request(format!("request timed out: {}", err))
        } else if err.is_connect() {
            ArticleError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            ArticleError::Body(err.to_string())
        } else {
            ArticleError::Request(err.to_string())
        }
    }
}

/// Errors reported by an [`Extractor`](crate::Extractor)
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Page body is zero-length; there is nothing to parse
    #[error("Document is empty")]
    EmptyDocument,

    /// Extractor-specific failure
    #[error("Extraction failed: {0}")]
    Other(String),
}

/// Errors that fail a whole batch
#[derive(Debug, Error)]
pub enum CollectError {
    /// Failed to build the batch's shared HTTP client
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Errors from running the HTTP server
#[derive(Debug, Error)]
pub enum ServeError {
    /// Could not bind the listening socket
    #[error("Failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Server loop terminated with an I/O error
    #[error("Server error")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ArticleError::Status(404).to_string(), "Got status 404");
        assert_eq!(ArticleError::Status(503).to_string(), "Got status 503");
        assert_eq!(
            ArticleError::Timeout(Duration::from_secs(30)).to_string(),
            "Timed out after 30 seconds"
        );
        assert_eq!(
            ArticleError::Timeout(Duration::from_millis(250)).to_string(),
            "Timed out after 0.25 seconds"
        );
        assert_eq!(
            ArticleError::BodyTooLarge(1024).to_string(),
            "Response body exceeds 1024 bytes"
        );
        assert_eq!(
            ArticleError::UnsupportedContentType("image/png".to_string()).to_string(),
            "Unsupported content type: image/png"
        );
    }

    #[test]
    fn test_extract_error_is_transparent() {
        let err: ArticleError = ExtractError::EmptyDocument.into();
        assert_eq!(err.to_string(), "Document is empty");
    }
}
