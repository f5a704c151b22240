//! HTTP endpoint
//!
//! A single route, `GET /`, reading repeated `url` query parameters:
//! - none: landing page
//! - more than the configured limit: 400 with a JSON error, nothing fetched
//! - otherwise: JSON array of article results in request order

use crate::collector::Collector;
use crate::config::ServerConfig;
use crate::error::ServeError;
use crate::types::RequestError;
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const INDEX_TEMPLATE: &str = include_str!("../assets/index.html");

/// State shared by all requests
#[derive(Clone, Debug)]
pub struct AppState {
    config: Arc<ServerConfig>,
    collector: Collector,
    index_html: Arc<str>,
}

impl AppState {
    /// State using the built-in extractor
    pub fn new(config: ServerConfig) -> Self {
        let collector = Collector::new(config.fetch_options().clone());
        Self::with_collector(config, collector)
    }

    /// State with a caller-provided collector
    pub fn with_collector(config: ServerConfig, collector: Collector) -> Self {
        let index_html = INDEX_TEMPLATE.replace("{{max_urls}}", &config.max_urls().to_string());
        Self {
            config: Arc::new(config),
            collector,
            index_html: index_html.into(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, serve until Ctrl-C, then drain
pub async fn run_server(config: ServerConfig) -> Result<(), ServeError> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, max_urls = config.max_urls(), "Clean listening");

    let app = create_router(AppState::new(config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        // Without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// GET / - landing page or batch extraction
async fn index(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let urls = requested_urls(query.as_deref());

    if urls.is_empty() {
        return Html(state.index_html.to_string()).into_response();
    }

    let max_urls = state.config.max_urls();
    if urls.len() > max_urls {
        warn!(requested = urls.len(), max_urls, "Rejecting oversized batch");
        let body = vec![RequestError::new(format!("Max {} URLs allowed", max_urls))];
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    match state.collector.collect(&urls).await {
        Ok(results) => (
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(results),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Batch failed");
            let body = vec![RequestError::new(err.to_string())];
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Every non-empty `url` query value, in order
fn requested_urls(query: Option<&str>) -> Vec<String> {
    let Some(query) = query else {
        return Vec::new();
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, value)| key == "url" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_urls() {
        assert!(requested_urls(None).is_empty());
        assert!(requested_urls(Some("")).is_empty());
        assert!(requested_urls(Some("foo=bar")).is_empty());

        let query = "url=https://a.example&x=1&url=https%3A%2F%2Fb.example%2F%3Fq%3D1";
        assert_eq!(
            requested_urls(Some(query)),
            vec!["https://a.example", "https://b.example/?q=1"]
        );
    }

    #[test]
    fn test_requested_urls_skips_blank_values() {
        assert_eq!(
            requested_urls(Some("url=&url=https://a.example&url")),
            vec!["https://a.example"]
        );
    }

    #[test]
    fn test_requested_urls_keeps_duplicates() {
        assert_eq!(requested_urls(Some("url=a&url=a")), vec!["a", "a"]);
    }

    #[test]
    fn test_index_page_mentions_limit() {
        let state = AppState::new(ServerConfig::builder().max_urls(7).build());
        assert!(state.index_html.contains("up to 7"));
        assert!(!state.index_html.contains("{{max_urls}}"));
        assert_eq!(state.config().max_urls(), 7);
    }
}
