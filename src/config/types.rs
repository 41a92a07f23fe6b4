use crate::url::HostPattern;
use crate::ConfigError;
use serde::Deserialize;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

/// Default bound on concurrent fetches within one round
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 50;

/// Main configuration structure, as read from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlOptions,

    #[serde(default)]
    pub quirks: QuirksConfig,
}

impl Config {
    /// Parses the configured exclusion patterns
    pub fn exclusion_patterns(&self) -> Result<Vec<HostPattern>, ConfigError> {
        self.quirks.exclude.iter().map(|p| HostPattern::parse(p)).collect()
    }
}

/// Crawl behavior options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrawlOptions {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-seconds", default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Accept invalid or self-signed TLS certificates
    #[serde(rename = "allow-insecure-tls", default)]
    pub allow_insecure_tls: bool,

    /// Follow links on the root host until no new pages are found
    #[serde(default)]
    pub recursive: bool,

    /// How far a non-recursive crawl reaches
    #[serde(rename = "non-recursive-scope", default)]
    pub non_recursive_scope: NonRecursiveScope,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            allow_insecure_tls: false,
            recursive: false,
            non_recursive_scope: NonRecursiveScope::default(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl CrawlOptions {
    /// Returns the last round a crawl may process, or `None` when unbounded
    ///
    /// Round 0 fetches the root. Round 1 fetches the links found on it.
    pub fn last_round(&self) -> Option<usize> {
        if self.recursive {
            None
        } else {
            Some(self.non_recursive_scope.last_round())
        }
    }
}

/// Reach of a non-recursive crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonRecursiveScope {
    /// Fetch only the root page
    RootOnly,

    /// Fetch the root page and check every link found on it
    #[default]
    OneHop,
}

impl NonRecursiveScope {
    fn last_round(self) -> usize {
        match self {
            Self::RootOnly => 0,
            Self::OneHop => 1,
        }
    }
}

/// Site-specific quirk configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuirksConfig {
    /// Extra host patterns that are never fetched (e.g. `"*.facebook.com"`)
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}
