use crate::UrlError;
use url::Url;

/// Normalizes an operator-supplied root listing URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Parse the URL; reject if malformed
/// 3. Reject anything that is not HTTP or HTTPS
/// 4. Remove the fragment (everything after #)
/// 5. Collapse trailing slashes into exactly one, so relative listing
///    links resolve beneath the root instead of beside it
///
/// # Examples
///
/// ```
/// use archive_scout::url::normalize_root_url;
///
/// let url = normalize_root_url("https://host.example/files/NES").unwrap();
/// assert_eq!(url.as_str(), "https://host.example/files/NES/");
/// ```
pub fn normalize_root_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    url.set_fragment(None);

    let path = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&path);

    Ok(url)
}

/// Returns the key under which a listing URL is recorded as visited
///
/// Trailing slashes are stripped so that `.../dir` and `.../dir/` are the
/// same node of the crawl tree.
pub fn visit_key(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}
