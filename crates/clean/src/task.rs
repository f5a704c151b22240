//! Article task: fetch and extract one URL
//!
//! The task is total. Whatever happens to its URL (non-200, network error,
//! extractor failure or panic, deadline) ends up as an [`ArticleResult`],
//! never as an error or panic visible to sibling tasks.

use crate::error::ArticleError;
use crate::extract::Extractor;
use crate::fetcher::Fetcher;
use crate::types::{Article, ArticleResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetch `url` through `fetcher`, extract it and normalize the outcome
pub async fn run_article_task(
    fetcher: &dyn Fetcher,
    extractor: Arc<dyn Extractor>,
    url: &str,
    timeout: Option<Duration>,
) -> ArticleResult {
    debug!(
        url,
        fetcher = fetcher.name(),
        extractor = extractor.name(),
        "Starting article task"
    );

    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch_and_extract(fetcher, extractor, url))
            .await
            .unwrap_or(Err(ArticleError::Timeout(limit))),
        None => fetch_and_extract(fetcher, extractor, url).await,
    };

    match outcome {
        Ok(article) => {
            debug!(url, title = %article.title, "Article extracted");
            ArticleResult::parsed(url, article)
        }
        Err(err) => {
            warn!(url, error = %err, "Article failed");
            ArticleResult::failed(url, err.to_string())
        }
    }
}

async fn fetch_and_extract(
    fetcher: &dyn Fetcher,
    extractor: Arc<dyn Extractor>,
    url: &str,
) -> Result<Article, ArticleError> {
    let page = fetcher.get(url).await?;

    if page.status != 200 {
        return Err(ArticleError::Status(page.status));
    }

    // Parsing is CPU-bound; keep it off the threads driving the fetches
    let owned_url = url.to_string();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&owned_url, &page.body))
        .await
        .map_err(|e| ArticleError::Worker(e.to_string()))?;

    Ok(extracted?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::extract::HtmlExtractor;
    use crate::fetcher::Page;
    use async_trait::async_trait;

    /// Fetcher answering from a fixed page or error
    struct StaticFetcher(fn() -> Result<Page, ArticleError>);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn get(&self, _url: &str) -> Result<Page, ArticleError> {
            (self.0)()
        }
    }

    /// Fetcher that never answers
    struct HangingFetcher;

    #[async_trait]
    impl Fetcher for HangingFetcher {
        fn name(&self) -> &'static str {
            "hanging"
        }

        async fn get(&self, _url: &str) -> Result<Page, ArticleError> {
            futures::future::pending().await
        }
    }

    struct PanickingExtractor;

    impl Extractor for PanickingExtractor {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn extract(&self, _url: &str, _html: &str) -> Result<Article, ExtractError> {
            panic!("boom");
        }
    }

    struct FailingExtractor;

    impl Extractor for FailingExtractor {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extract(&self, _url: &str, _html: &str) -> Result<Article, ExtractError> {
            Err(ExtractError::Other("unparseable markup".to_string()))
        }
    }

    fn html_extractor() -> Arc<dyn Extractor> {
        Arc::new(HtmlExtractor::new())
    }

    #[tokio::test]
    async fn test_success_record() {
        let fetcher = StaticFetcher(|| {
            Ok(Page::ok("<html><title>Hi</title><body>Hello world</body></html>"))
        });
        let result =
            run_article_task(&fetcher, html_extractor(), "https://example.com/a", None).await;

        assert!(result.is_ok());
        match result {
            ArticleResult::Parsed(parsed) => {
                assert_eq!(parsed.title, "Hi");
                assert_eq!(parsed.text, "Hello world");
                assert_eq!(parsed.url, "https://example.com/a");
                assert!(parsed.publish_date.is_none());
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_200_record() {
        let fetcher = StaticFetcher(|| Ok(Page::status(404)));
        let url = "https://example.com/missing";
        let result = run_article_task(&fetcher, html_extractor(), url, None).await;

        assert_eq!(result, ArticleResult::failed(url, "Got status 404"));
    }

    #[tokio::test]
    async fn test_fetch_error_record() {
        let fetcher =
            StaticFetcher(|| Err(ArticleError::Connect("connection refused".to_string())));
        let result = run_article_task(&fetcher, html_extractor(), "http://127.0.0.1:1/", None)
            .await;

        assert!(!result.is_ok());
        assert_eq!(
            result.error(),
            Some("Failed to connect to server: connection refused")
        );
    }

    #[tokio::test]
    async fn test_extractor_error_record() {
        let fetcher = StaticFetcher(|| Ok(Page::ok("<p>x</p>")));
        let result = run_article_task(&fetcher, Arc::new(FailingExtractor), "u", None).await;

        assert_eq!(result.error(), Some("Extraction failed: unparseable markup"));
    }

    #[tokio::test]
    async fn test_extractor_panic_is_contained() {
        let fetcher = StaticFetcher(|| Ok(Page::ok("<p>x</p>")));
        let result = run_article_task(&fetcher, Arc::new(PanickingExtractor), "u", None).await;

        assert!(!result.is_ok());
        assert!(result.error().unwrap().starts_with("Extraction worker failed"));
    }

    #[tokio::test]
    async fn test_deadline_produces_timeout_record() {
        let result = run_article_task(
            &HangingFetcher,
            html_extractor(),
            "https://slow.example.com",
            Some(Duration::from_millis(50)),
        )
        .await;

        assert_eq!(
            result,
            ArticleResult::failed("https://slow.example.com", "Timed out after 0.05 seconds")
        );
    }
}
