use serde::Serialize;
use std::fmt;
use url::Url;

/// Status code reported when the fetch itself failed
pub const EXCEPTION_STATUS: i32 = -100;

/// Status code reserved for a response a quirk could not reinterpret
///
/// No rule produces it yet.
pub const QUIRKY_STATUS: i32 = -200;

/// Status text reported alongside [`EXCEPTION_STATUS`]
pub const EXCEPTION_TEXT: &str = "Exception during request, see logs for more information";

/// Outcome of checking one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    /// The checked address
    pub url: Url,
    /// HTTP status code, or a negative sentinel
    pub status_code: i32,
    /// Reason phrase or diagnostic
    pub status_text: String,
    /// True if a quirk changed the outcome
    pub is_quirky: bool,
}

impl CrawlResult {
    /// Result for an address whose fetch failed
    pub fn exception(url: Url) -> Self {
        Self {
            url,
            status_code: EXCEPTION_STATUS,
            status_text: EXCEPTION_TEXT.to_string(),
            is_quirky: false,
        }
    }

    /// True for a plain 200 response
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// True if the fetch failed before any response was received
    pub fn is_exception(&self) -> bool {
        self.status_code < 0
    }

    /// True for a real non-200 response, or any quirky one
    pub fn is_error(&self) -> bool {
        (self.status_code != 200 && self.status_code > 0) || self.is_quirky
    }
}

impl fmt::Display for CrawlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.status_code, self.url, self.status_text)
    }
}
