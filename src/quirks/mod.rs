//! Site-specific quirks
//!
//! Some sites answer in ways that make a naive link check wrong. This module
//! holds three independent rules:
//! - exclusion: addresses that are never fetched
//! - canonicalization: alternate spellings rewritten to one form before fetch
//! - response reinterpretation: status codes that are wrong but mean "fine"
//!
//! All rules are pure functions. [`Quirks`] bundles them with the exclusion
//! patterns a user adds in the configuration file.

use crate::crawler::ResponseRecord;
use crate::url::{extract_host, HostPattern};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// X (formerly Twitter) requires a logged-in session and answers 200 for
/// every page, gone or not.
static X_TWITTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?(?:twitter|x)\.com/").expect("X/Twitter regex should compile")
});

static YOUTUBE_WATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?youtube\.com/watch\?(?:[^#]*&)?v=(?P<id>[A-Za-z0-9_-]+)")
        .expect("YouTube regex should compile")
});

static YOUTUBE_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://youtu\.be/(?P<id>[A-Za-z0-9_-]+)")
        .expect("YouTube short link regex should compile")
});

static LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[a-zA-Z0-9-]+\.)?linkedin\.com/").expect("LinkedIn regex should compile")
});

/// LinkedIn's answer to clients it considers automated (https://http.dev/999)
const LINKEDIN_REQUEST_DENIED: u16 = 999;

/// Final status of a response after quirks were applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reinterpreted {
    pub status_code: i32,
    pub status_text: String,
    pub is_quirky: bool,
}

/// Returns true for addresses that must never be fetched
pub fn is_excluded(url: &Url) -> bool {
    X_TWITTER.is_match(url.as_str())
}

/// Rewrites known alternate forms of an address to one canonical form
///
/// YouTube short links and watch links (with any extra query parameters)
/// both become `https://www.youtube.com/watch?v=<id>`. Addresses matching
/// no rule are returned unchanged. Applying this twice gives the same
/// result as applying it once.
///
/// # Examples
///
/// ```
/// use linkspector::quirks::canonicalize;
/// use url::Url;
///
/// let short = Url::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
/// assert_eq!(
///     canonicalize(&short).as_str(),
///     "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
/// );
/// ```
pub fn canonicalize(url: &Url) -> Url {
    let address = url.as_str();
    let video_id = YOUTUBE_SHORT
        .captures(address)
        .or_else(|| YOUTUBE_WATCH.captures(address))
        .and_then(|captures| captures.name("id"));

    match video_id {
        Some(id) => {
            let canonical = format!("https://www.youtube.com/watch?v={}", id.as_str());
            Url::parse(&canonical).unwrap_or_else(|_| url.clone())
        }
        None => url.clone(),
    }
}

/// Reinterprets a response that is technically wrong but semantically fine
pub fn unquirkify_response(url: &Url, response: &ResponseRecord) -> Reinterpreted {
    if response.status_code == LINKEDIN_REQUEST_DENIED && LINKEDIN.is_match(url.as_str()) {
        return Reinterpreted {
            status_code: 200,
            status_text: "OK (LinkedIn)".to_string(),
            is_quirky: true,
        };
    }

    Reinterpreted {
        status_code: i32::from(response.status_code),
        status_text: response.reason.clone(),
        is_quirky: false,
    }
}

/// Built-in quirks plus user-configured exclusions
#[derive(Debug, Clone, Default)]
pub struct Quirks {
    extra_exclusions: Vec<HostPattern>,
}

impl Quirks {
    /// Creates quirks with additional excluded host patterns
    pub fn with_exclusions(extra_exclusions: Vec<HostPattern>) -> Self {
        Self { extra_exclusions }
    }

    /// Returns true if the address is excluded by a built-in rule or by
    /// one of the configured host patterns
    pub fn excludes(&self, url: &Url) -> bool {
        if is_excluded(url) {
            return true;
        }
        match extract_host(url) {
            Some(host) => self.extra_exclusions.iter().any(|p| p.matches(&host)),
            None => false,
        }
    }

    /// See [`canonicalize`]
    pub fn canonicalize(&self, url: &Url) -> Url {
        canonicalize(url)
    }

    /// See [`unquirkify_response`]
    pub fn reinterpret(&self, url: &Url, response: &ResponseRecord) -> Reinterpreted {
        unquirkify_response(url, response)
    }
}
