use crate::UrlError;
use url::Url;

/// Parses and normalizes an address string
///
/// # Normalization Steps
///
/// 1. Parse the address; reject if malformed. Parsing already lowercases
///    the scheme and host, drops default ports and turns an empty path
///    into `/`.
/// 2. Accept only `http` and `https`
/// 3. Require a host
/// 4. Remove the fragment (everything after `#`)
///
/// Query strings and path casing are kept: they can select different
/// resources on the server.
///
/// # Examples
///
/// ```
/// use linkspector::url::normalize_address;
///
/// let url = normalize_address("HTTPS://Example.COM:443/Docs#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/Docs");
/// ```
pub fn normalize_address(address: &str) -> Result<Url, UrlError> {
    let url = Url::parse(address.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed address
///
/// Used for addresses produced by [`Url::join`], which are parsed but may
/// still carry a fragment or a non-HTTP scheme.
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    Ok(url)
}
