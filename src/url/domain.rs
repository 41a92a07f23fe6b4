use url::Url;

/// Extracts the lowercase host of an address, without the port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkspector::url::extract_host;
///
/// let url = Url::parse("https://Docs.Example.com:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("docs.example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both addresses name the same host
///
/// Ports and schemes are ignored: `http://example.com` and
/// `https://example.com:8443` are on the same host. Addresses without a
/// host never match.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
