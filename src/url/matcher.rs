use url::Url;

/// Checks if a host matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "archive.org" matches only "archive.org"
/// 2. Wildcard match: "*.archive.org" matches "archive.org" and any of
///    its subdomains, however deeply nested
///
/// # Examples
///
/// ```
/// use archive_scout::url::matches_wildcard;
///
/// assert!(matches_wildcard("archive.org", "archive.org"));
/// assert!(!matches_wildcard("archive.org", "ia800.archive.org"));
/// assert!(matches_wildcard("*.archive.org", "ia800.us.archive.org"));
/// assert!(!matches_wildcard("*.archive.org", "notarchive.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Checks if an absolute link falls under an allow-list entry
///
/// An entry has the shape `host[/path-prefix]`, where the host may be a
/// wildcard pattern (see [`matches_wildcard`]). The link's host is
/// compared case-insensitively and its path must start with the prefix.
///
/// # Examples
///
/// ```
/// use archive_scout::url::matches_allowed;
///
/// assert!(matches_allowed("archive.org/download", "https://archive.org/download/nes-set/x.zip"));
/// assert!(!matches_allowed("archive.org/download", "https://archive.org/details/nes-set"));
/// ```
pub fn matches_allowed(entry: &str, link: &str) -> bool {
    let Ok(url) = Url::parse(link) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };

    let (host_pattern, path_prefix) = match entry.find('/') {
        Some(idx) => (&entry[..idx], &entry[idx..]),
        None => (entry, ""),
    };

    matches_wildcard(&host_pattern.to_lowercase(), &host.to_lowercase())
        && url.path().starts_with(path_prefix)
}
