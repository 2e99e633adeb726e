use url::Url;

/// Resolves a directory link against the listing it was found on
///
/// The result always ends in `/` so that its own relative links resolve
/// beneath it.
pub fn resolve_directory(base: &Url, href: &str) -> Option<Url> {
    let mut url = join_relative(base, href)?;
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Some(url)
}

/// Resolves a file link against the listing it was found on
///
/// A spurious trailing slash (some hosts append one to file URLs) is
/// dropped before resolution.
pub fn resolve_file(base: &Url, href: &str) -> Option<Url> {
    let mut url = join_relative(base, href.trim_end_matches('/'))?;
    url.set_fragment(None);
    Some(url)
}

/// Joins `href` to `base`, reading a colon in the first segment as part of
/// a name (`Zelda: Link.zip`) rather than as a scheme
fn join_relative(base: &Url, href: &str) -> Option<Url> {
    let first_segment = href
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();

    if first_segment.contains(':') && !href.contains("://") {
        base.join(&format!("./{}", href)).ok()
    } else {
        base.join(href).ok()
    }
}

/// Derives the human-readable name of a file from its URL
///
/// This is the final non-empty path segment, percent-decoded. Segments
/// that do not decode to UTF-8 are returned as-is.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use archive_scout::url::display_name;
///
/// let url = Url::parse("https://h.example/roms/Tetris%20(World).zip").unwrap();
/// assert_eq!(display_name(&url), "Tetris (World).zip");
/// ```
pub fn display_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();

    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}

/// Checks whether `candidate` lies at or beneath `root`
///
/// Both must share scheme, host and port, and the candidate's path must
/// start with the root's path.
pub fn is_within(root: &Url, candidate: &Url) -> bool {
    root.scheme() == candidate.scheme()
        && root.host_str() == candidate.host_str()
        && root.port_or_known_default() == candidate.port_or_known_default()
        && candidate.path().starts_with(root.path())
}
