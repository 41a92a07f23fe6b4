//! Crawler module for link checking
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`FetchGateway`] seam
//! - Link extraction from HTML bodies
//! - Progress counters for an observer
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod progress;
mod result;

pub use coordinator::{run_crawl, Coordinator};
pub use extractor::{extract_links, strip_comments};
pub use fetcher::{
    build_http_client, is_html, FetchError, FetchGateway, FetchOutcome, HttpGateway,
    ResponseRecord, USER_AGENT,
};
pub use progress::Progress;
pub use result::{CrawlResult, EXCEPTION_STATUS, EXCEPTION_TEXT, QUIRKY_STATUS};

use crate::config::Config;
use crate::quirks::Quirks;
use crate::url::normalize_address;
use crate::LinkSpectorError;

/// Runs a complete crawl operation
///
/// This is the main entry point for a one-shot check. It will:
/// 1. Normalize the root address
/// 2. Build the HTTP gateway from the crawl options
/// 3. Add the configured exclusions to the built-in quirks
/// 4. Crawl and return every result, sorted by address
///
/// # Arguments
///
/// * `root` - The address to start from
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(results)` - Crawl completed
/// * `Err(LinkSpectorError)` - Invalid root address, exclusion pattern or client setup
pub async fn crawl(root: &str, config: &Config) -> Result<Vec<CrawlResult>, LinkSpectorError> {
    let root = normalize_address(root)?;
    let quirks = Quirks::with_exclusions(config.exclusion_patterns()?);
    run_crawl(root, config.crawl.clone(), quirks).await
}
