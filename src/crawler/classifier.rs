//! Link classification
//!
//! Listings mix real sub-directories, files and site navigation. Only the
//! textual shape of a link is available to tell them apart.

use crate::catalog::Category;

/// Archive extensions recognised regardless of category
///
/// A slash-terminated link with one of these is a file, not a directory.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "7z", "rar", "nes", "smc", "sfc", "md", "gen", "gb", "gbc", "gba",
];

/// Directory names that are site chrome rather than content
const NAVIGATION_PATHS: &[&str] = &[
    "about", "donate", "help", "contact", "terms", "privacy", "blog", "news", "support", "login",
    "register", "account", "api", "admin", "assets", "css", "js", "images", "img", "static",
    "public", "common", "shared", "lib", "libraries",
];

/// What a listing link denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A sub-directory to descend into
    Directory,
    /// A file matching the category's extensions
    File,
    /// Anything else
    Ignore,
}

/// Classifies a listing link for a category
///
/// # Rules (evaluated in order)
///
/// 1. Empty, query-only, `/` itself, or parent-relative → Ignore
/// 2. Scheme-qualified (absolute) → Ignore
/// 3. No trailing slash → file candidate, otherwise directory candidate
/// 4. Directory candidate ending in a known archive extension → file candidate
/// 5. Directory candidate named like site navigation → Ignore
/// 6. File candidate whose extension the category accepts → File, else Ignore
///
/// # Examples
///
/// ```
/// use archive_scout::{classify, Category, LinkKind};
///
/// let nes = Category::new("nes", "NES", ["zip", "nes"]);
/// assert_eq!(classify("Homebrew/", &nes), LinkKind::Directory);
/// assert_eq!(classify("Contra.ZIP", &nes), LinkKind::File);
/// assert_eq!(classify("Contra.zip/", &nes), LinkKind::File);
/// assert_eq!(classify("../", &nes), LinkKind::Ignore);
/// ```
pub fn classify(link: &str, category: &Category) -> LinkKind {
    let link = link.trim();

    if link.is_empty()
        || link.starts_with('?')
        || link == "/"
        || link == ".."
        || link.starts_with("../")
    {
        return LinkKind::Ignore;
    }

    if has_scheme(link) {
        return LinkKind::Ignore;
    }

    let stripped = link.trim_end_matches('/');
    let is_file = if link.ends_with('/') {
        if has_archive_extension(stripped) {
            true
        } else if is_navigation_path(stripped) {
            return LinkKind::Ignore;
        } else {
            false
        }
    } else {
        true
    };

    if !is_file {
        return LinkKind::Directory;
    }

    match extension_of(stripped) {
        Some(ext) if category.accepts_extension(ext) => LinkKind::File,
        _ => LinkKind::Ignore,
    }
}

/// Whether a link (trailing slashes ignored) ends in a known archive extension
pub fn has_archive_extension(link: &str) -> bool {
    extension_of(link.trim_end_matches('/'))
        .map(|ext| ARCHIVE_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// The text after the last `.` of the final path segment, if any
fn extension_of(link: &str) -> Option<&str> {
    let name = link.rsplit('/').next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// `scheme:` prefix per RFC 3986 (letter, then letters, digits, `+ - .`)
/// `scheme://...`; a bare colon inside a file name does not count
fn has_scheme(link: &str) -> bool {
    let Some((scheme, rest)) = link.split_once(':') else {
        return false;
    };
    if !rest.starts_with("//") {
        return false;
    }
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn is_navigation_path(stripped: &str) -> bool {
    let name = stripped.trim_start_matches('/').to_ascii_lowercase();
    NAVIGATION_PATHS.contains(&name.as_str())
}
