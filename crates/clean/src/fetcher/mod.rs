//! Page fetching
//!
//! Design: the article task only needs "status and body for a URL". The
//! [`Fetcher`] trait is that seam; [`HttpFetcher`] implements it on top of
//! one `reqwest::Client` shared by every task of a batch.

mod http;

pub use http::{build_client, HttpFetcher};

use crate::error::ArticleError;
use async_trait::async_trait;

/// Raw response for one URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// HTTP status code
    pub status: u16,
    /// Body decoded with the declared charset; empty unless `status` is 200
    pub body: String,
}

impl Page {
    /// A 200 page with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A bodiless page with the given status
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }
}

/// Trait for anything that can GET a page
///
/// Implementations must be safe to call concurrently from every task in a
/// batch.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Issue a GET for `url`
    ///
    /// Non-200 statuses are not errors at this level; they come back as a
    /// [`Page`] with an empty body.
    async fn get(&self, url: &str) -> Result<Page, ArticleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_constructors() {
        let page = Page::ok("<html></html>");
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<html></html>");

        let page = Page::status(404);
        assert_eq!(page.status, 404);
        assert!(page.body.is_empty());
    }
}
