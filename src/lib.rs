//! LinkSpector: a broken link checker
//!
//! This crate crawls a website from a root address, checks every link it
//! finds, and follows links that stay on the root host.

pub mod config;
pub mod crawler;
pub mod output;
pub mod quirks;
pub mod url;

use thiserror::Error;

/// Main error type for LinkSpector operations
///
/// Failures of individual fetches never surface here; they are recorded
/// per address in the crawl results.
#[derive(Debug, Error)]
pub enum LinkSpectorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),
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

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
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

/// Result type alias for LinkSpector operations
pub type Result<T> = std::result::Result<T, LinkSpectorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlOptions, NonRecursiveScope};
pub use crawler::{Coordinator, CrawlResult, FetchGateway, HttpGateway, Progress};
pub use crate::url::{extract_host, normalize_address};
