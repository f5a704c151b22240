//! Startup configuration
//!
//! Everything request handling needs is carried in [`ServerConfig`], built
//! once at startup and handed to the router. Nothing is read from ambient
//! globals after that.

use crate::DEFAULT_USER_AGENT;
use std::net::SocketAddr;
use std::time::Duration;

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8006;

/// Default number of URLs accepted per request
pub const DEFAULT_MAX_URLS: usize = 5;

/// Default deadline for one article task (fetch + extraction)
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Default TCP/TLS connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on a downloaded page
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Options governing how each batch fetches its pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Connect timeout of the shared client
    pub connect_timeout: Duration,
    /// Deadline per article task; `None` waits forever
    pub task_timeout: Option<Duration>,
    /// Largest body read before giving up
    pub max_body_bytes: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            task_timeout: Some(DEFAULT_TASK_TIMEOUT),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    host: String,
    port: u16,
    max_urls: usize,
    fetch: FetchOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfigBuilder::new().build()
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` as given, resolved when binding
    pub fn bind_addr(&self) -> String {
        // Bare IPv6 literals need brackets
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }

    /// Maximum URLs accepted per request
    pub fn max_urls(&self) -> usize {
        self.max_urls
    }

    pub fn fetch_options(&self) -> &FetchOptions {
        &self.fetch
    }
}

/// Builder for [`ServerConfig`]
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    host: String,
    port: u16,
    max_urls: usize,
    fetch: FetchOptions,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerConfigBuilder {
    /// Create a builder with all defaults
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_urls: DEFAULT_MAX_URLS,
            fetch: FetchOptions::default(),
        }
    }

    /// Set listen host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set listen port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set per-request URL limit
    pub fn max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = max_urls;
        self
    }

    /// Set per-article deadline, `None` to disable
    pub fn task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch.task_timeout = timeout;
        self
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.fetch.connect_timeout = timeout;
        self
    }

    /// Set body size cap
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.fetch.max_body_bytes = bytes;
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.fetch.user_agent = ua.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            max_urls: self.max_urls,
            fetch: self.fetch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), 8006);
        assert_eq!(config.max_urls(), 5);
        assert_eq!(config.fetch_options().task_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.fetch_options().user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.bind_addr(), "0.0.0.0:8006");
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::builder()
            .host("127.0.0.1")
            .port(9000)
            .max_urls(10)
            .task_timeout(None)
            .connect_timeout(Duration::from_secs(2))
            .max_body_bytes(1024)
            .user_agent("TestAgent/1.0")
            .build();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.max_urls(), 10);
        let fetch = config.fetch_options();
        assert_eq!(fetch.task_timeout, None);
        assert_eq!(fetch.connect_timeout, Duration::from_secs(2));
        assert_eq!(fetch.max_body_bytes, 1024);
        assert_eq!(fetch.user_agent, "TestAgent/1.0");
    }

    #[test]
    fn test_bind_addr_ipv6_and_hostname() {
        let config = ServerConfig::builder().host("::1").port(80).build();
        assert_eq!(config.bind_addr(), "[::1]:80");

        let config = ServerConfig::builder().host("localhost").port(80).build();
        assert_eq!(config.bind_addr(), "localhost:80");
    }
}
