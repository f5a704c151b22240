//! Clean - article extraction over HTTP
//!
//! Given one or more article URLs, Clean fetches each page and extracts
//! its title, main text, lead image, publish date and authors.
//!
//! ## Pipeline
//!
//! - [`Fetcher`] - GETs a page ([`HttpFetcher`] over a batch-shared client)
//! - [`Extractor`] - turns HTML into an [`Article`] ([`HtmlExtractor`])
//! - [`run_article_task`] - fetch + extract one URL, every outcome a record
//! - [`Collector`] - runs one task per URL concurrently, keeps input order
//! - [`create_router`] / [`run_server`] - the `GET /?url=...` endpoint
//!
//! Per-URL failures never fail a batch; they come back as
//! `{"ok": false, "error": ..., "url": ...}` records.

pub mod collector;
pub mod config;
mod error;
pub mod extract;
pub mod fetcher;
pub mod server;
pub mod task;
mod types;

pub use collector::{collect, Collector};
pub use config::{FetchOptions, ServerConfig, ServerConfigBuilder};
pub use error::{ArticleError, CollectError, ExtractError, ServeError};
pub use extract::{Extractor, HtmlExtractor};
pub use fetcher::{Fetcher, HttpFetcher, Page};
pub use server::{create_router, run_server, AppState};
pub use task::run_article_task;
pub use types::{Article, ArticleResult, FailedArticle, ParsedArticle, RequestError};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Clean/1.0; +https://github.com/beshrkayali/clean)";

/// JSON Schema of one element of the response array
pub fn result_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(ArticleResult);
    serde_json::to_value(schema).unwrap_or_default()
}
