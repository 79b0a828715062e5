//! Tidepool: a bounded-concurrency, depth-limited web crawler
//!
//! This crate implements a crawler that fans a dynamically discovered set of
//! URLs out over a fixed pool of concurrent fetch workers, with URL
//! deduplication, bounded retries, a domain allow-list, and cooperative
//! cancellation/timeout.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for tidepool operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid start URL: {0}")]
    InvalidStartUrl(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Control-flow signal: the shared cancellation token fired.
    #[error("Crawl cancelled")]
    Cancelled,

    /// Control-flow signal: the frontier is closed and drained.
    #[error("Frontier queue closed")]
    QueueClosed,

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for tidepool operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{Coordinator, CrawlOutcome, CrawlResult};
pub use frontier::{FrontierQueue, QueueError, WorkItem};
