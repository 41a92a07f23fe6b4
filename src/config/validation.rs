use crate::config::types::{Config, CrawlOptions, QuirksConfig};
use crate::url::HostPattern;
use crate::ConfigError;

/// Upper bound for the per-request timeout, in seconds
const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Upper bound for concurrent fetches
const MAX_CONCURRENT_FETCHES: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_options(&config.crawl)?;
    validate_quirks(&config.quirks)?;
    Ok(())
}

/// Validates crawl options
///
/// Also called by the binary after command-line overrides are applied.
pub fn validate_crawl_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    if options.timeout_seconds < 1 || options.timeout_seconds > MAX_TIMEOUT_SECONDS {
        return Err(ConfigError::Validation(format!(
            "timeout-seconds must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECONDS, options.timeout_seconds
        )));
    }

    if options.max_concurrent_fetches < 1 || options.max_concurrent_fetches > MAX_CONCURRENT_FETCHES
    {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, options.max_concurrent_fetches
        )));
    }

    Ok(())
}

/// Validates exclusion patterns
fn validate_quirks(quirks: &QuirksConfig) -> Result<(), ConfigError> {
    for pattern in &quirks.exclude {
        HostPattern::parse(pattern)?;
    }
    Ok(())
}
