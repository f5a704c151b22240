//! Fan-out collector for Clean
//!
//! This module provides the main entry points for processing a batch of
//! URLs. Per-URL work lives in [`task`](crate::task); the collector owns the
//! batch's shared HTTP client and puts results back into request order.

use crate::config::FetchOptions;
use crate::error::CollectError;
use crate::extract::{Extractor, HtmlExtractor};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::task::run_article_task;
use crate::types::ArticleResult;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Collect a batch with default options and the built-in extractor
///
/// For custom options, use [`Collector`].
pub async fn collect(urls: &[String]) -> Result<Vec<ArticleResult>, CollectError> {
    Collector::new(FetchOptions::default()).collect(urls).await
}

/// Runs one article task per URL and gathers the results
#[derive(Clone)]
pub struct Collector {
    options: FetchOptions,
    extractor: Arc<dyn Extractor>,
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("options", &self.options)
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

impl Collector {
    /// Create a collector using [`HtmlExtractor`]
    pub fn new(options: FetchOptions) -> Self {
        Self::with_extractor(options, Arc::new(HtmlExtractor::new()))
    }

    /// Create a collector with a custom extractor
    pub fn with_extractor(options: FetchOptions, extractor: Arc<dyn Extractor>) -> Self {
        Self { options, extractor }
    }

    /// Fetch and extract every URL concurrently over one shared client
    ///
    /// Output position `i` answers input position `i`. Only failing to
    /// build the client fails the batch; per-URL failures are records.
    pub async fn collect(&self, urls: &[String]) -> Result<Vec<ArticleResult>, CollectError> {
        let fetcher = HttpFetcher::from_options(&self.options)?;
        let results = self.collect_with(&fetcher, urls).await;
        // Client (and its pool) is released here on every path
        drop(fetcher);
        Ok(results)
    }

    /// Same as [`collect`](Self::collect) over a caller-provided fetcher
    pub async fn collect_with(
        &self,
        fetcher: &dyn Fetcher,
        urls: &[String],
    ) -> Vec<ArticleResult> {
        let started = Instant::now();

        // join_all yields in input order, whatever the completion order
        let results = join_all(urls.iter().map(|url| {
            run_article_task(
                fetcher,
                Arc::clone(&self.extractor),
                url,
                self.options.task_timeout,
            )
        }))
        .await;

        let ok = results.iter().filter(|r| r.is_ok()).count();
        info!(
            urls = urls.len(),
            ok,
            failed = results.len() - ok,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch collected"
        );

        results
    }
}
