//! Pattern-based link extraction
//!
//! This module finds the addresses an HTML page references without building
//! a DOM:
//! - Comment blocks (`<!-- ... -->`) are stripped first
//! - Absolute `http://` / `https://` runs anywhere in the markup
//! - Relative `href="..."` and `src="..."` values, resolved against the page
//!
//! Non-HTML content yields no links. A match that is not a valid address is
//! logged and dropped; it never aborts extraction of the page.

use crate::crawler::fetcher::is_html;
use crate::url::normalize_parsed;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// An absolute address runs until whitespace, a quote or a tag delimiter
static ABSOLUTE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>]+"#).expect("absolute link regex should compile")
});

static ATTRIBUTE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute link regex should compile")
});

/// Prefixes of attribute values that are not resolved against the page
const SKIPPED_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "tel:", "#"];

/// Extracts every address referenced by a page
///
/// # Arguments
///
/// * `body` - The page content
/// * `content_type` - The Content-Type the page was served with
/// * `base` - The address the page was fetched from
///
/// # Returns
///
/// The set of normalized absolute addresses; empty unless `content_type`
/// is `text/html`.
///
/// # Example
///
/// ```
/// use linkspector::crawler::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://example.test/").unwrap();
/// let links = extract_links(r#"<a href="/about">About</a>"#, "text/html", &base);
/// assert!(links.contains(&Url::parse("https://example.test/about").unwrap()));
/// ```
pub fn extract_links(body: &str, content_type: &str, base: &Url) -> HashSet<Url> {
    if !is_html(content_type) {
        return HashSet::new();
    }

    let sanitized = strip_comments(body);
    let mut links = extract_absolute(&sanitized);
    links.extend(extract_relative(&sanitized, base));

    tracing::trace!("Extracted {} links from {}", links.len(), base);
    links
}

/// Removes every `<!-- ... -->` block in a single forward scan
///
/// Comments do not nest: the first `-->` after an opening delimiter closes
/// it. An unterminated comment swallows the rest of the document, as a
/// browser would.
pub fn strip_comments(html: &str) -> Cow<'_, str> {
    if !html.contains(COMMENT_OPEN) {
        return Cow::Borrowed(html);
    }

    let mut sanitized = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find(COMMENT_OPEN) {
        sanitized.push_str(&rest[..open]);
        let after_open = &rest[open + COMMENT_OPEN.len()..];
        match after_open.find(COMMENT_CLOSE) {
            Some(close) => rest = &after_open[close + COMMENT_CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    sanitized.push_str(rest);

    Cow::Owned(sanitized)
}

fn extract_absolute(html: &str) -> HashSet<Url> {
    ABSOLUTE_LINK
        .find_iter(html)
        .filter_map(|m| match Url::parse(m.as_str()) {
            Ok(url) => accept(url, m.as_str()),
            Err(e) => {
                tracing::debug!("Discarding invalid address '{}': {}", m.as_str(), e);
                None
            }
        })
        .collect()
}

fn extract_relative(html: &str, base: &Url) -> HashSet<Url> {
    ATTRIBUTE_LINK
        .captures_iter(html)
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|value| value.as_str().trim())
        .filter(|value| !value.is_empty() && !is_skipped(value))
        .filter_map(|value| match base.join(value) {
            Ok(url) => accept(url, value),
            Err(e) => {
                tracing::debug!("Discarding unresolvable link '{}' on {}: {}", value, base, e);
                None
            }
        })
        .collect()
}

fn is_skipped(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    SKIPPED_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix))
}

fn accept(url: Url, raw: &str) -> Option<Url> {
    match normalize_parsed(url) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Discarding link '{}': {}", raw, e);
            None
        }
    }
}
