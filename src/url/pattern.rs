use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A host pattern used for user-configured exclusions
///
/// Two forms are supported:
/// 1. Exact: `"example.com"` matches only `example.com`
/// 2. Wildcard: `"*.example.com"` matches `example.com` itself and any
///    subdomain such as `blog.example.com` or `api.v2.example.com`
///
/// Patterns are lowercased when parsed; candidates are expected to come
/// from [`crate::url::extract_host`], which lowercases as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPattern {
    base: String,
    wildcard: bool,
}

impl HostPattern {
    /// Parses a pattern, rejecting malformed hosts
    ///
    /// # Examples
    ///
    /// ```
    /// use linkspector::url::HostPattern;
    ///
    /// let pattern = HostPattern::parse("*.example.com").unwrap();
    /// assert!(pattern.matches("example.com"));
    /// assert!(pattern.matches("blog.example.com"));
    /// assert!(!pattern.matches("notexample.com"));
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = pattern.trim().to_lowercase();
        if pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Host pattern cannot be empty".to_string(),
            ));
        }

        let (base, wildcard) = match pattern.strip_prefix("*.") {
            Some(base) => (base.to_string(), true),
            None => (pattern, false),
        };
        validate_host(&base)?;

        Ok(Self { base, wildcard })
    }

    /// Returns true if `host` is covered by this pattern
    pub fn matches(&self, host: &str) -> bool {
        if host == self.base {
            return true;
        }
        self.wildcard
            && host
                .strip_suffix(self.base.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

impl FromStr for HostPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            write!(f, "*.{}", self.base)
        } else {
            f.write_str(&self.base)
        }
    }
}

/// Validates a host string (without wildcard prefix)
fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot contain consecutive dots",
            host
        )));
    }

    Ok(())
}
