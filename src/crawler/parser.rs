//! Directory listing parser
//!
//! This module turns a listing page into candidate links:
//! - Anchor targets in document order (from `<a href>` tags)
//! - A size hint per anchor when the listing shows one
//! - A coarse relevance filter that drops navigation chrome and caps the
//!   number of links processed per listing

use crate::crawler::classifier::has_archive_extension;
use crate::url::matches_allowed;
use scraper::{ElementRef, Html, Node, Selector};

/// An anchor found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    /// The raw `href` attribute value
    pub href: String,
    /// File size shown next to the link, if any
    pub size_hint: Option<u64>,
}

/// Extracts every anchor target of a listing, in document order
///
/// # Example
///
/// ```
/// use archive_scout::crawler::extract_links;
///
/// let html = r#"<pre><a href="../">../</a><a href="Tetris.zip">Tetris.zip</a></pre>"#;
/// assert_eq!(extract_links(html), vec!["../", "Tetris.zip"]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    extract_listing(html).into_iter().map(|l| l.href).collect()
}

/// Extracts every anchor of a listing together with its size hint
///
/// Sizes are read from the surrounding table row in table-style listings
/// (Apache, lighttpd, most mirror front ends) or from the text trailing the
/// anchor in `<pre>`-style listings (nginx autoindex).
pub fn extract_listing(html: &str) -> Vec<ListingLink> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim().to_string();
            Some(ListingLink {
                href,
                size_hint: size_hint(&anchor),
            })
        })
        .collect()
}

/// Looks for a size next to an anchor
fn size_hint(anchor: &ElementRef) -> Option<u64> {
    if let Some(row) = enclosing_row(anchor) {
        let cell_selector = Selector::parse("td").ok()?;
        return row
            .select(&cell_selector)
            .filter(|cell| !cell.descendants().any(|n| n.id() == anchor.id()))
            .find_map(|cell| parse_size(cell.text().collect::<String>().trim()));
    }

    // <pre> listings: `<a href="x">x</a>    19-Oct-2020 10:00    12345`
    let trailing = anchor.next_sibling()?;
    let Node::Text(text) = trailing.value() else {
        return None;
    };
    text.split_whitespace().last().and_then(parse_size)
}

/// Finds the `<tr>` an anchor sits in, if it is close enough to count
fn enclosing_row<'a>(anchor: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    anchor
        .ancestors()
        .take(4)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "tr")
}

/// Parses a size as shown in directory listings
///
/// Accepts plain byte counts (`12345`, `12,345`), and decimal values with a
/// `K`, `M`, `G` or `T` suffix optionally followed by `B` or `iB`
/// (`1.5M`, `700 KiB`, `3.2 GB`). Suffixes are binary multiples. A bare
/// `B` or `bytes` suffix is plain bytes. Anything else, including `-`, is
/// not a size.
pub fn parse_size(text: &str) -> Option<u64> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let number = number.replace(',', "");
    if number.is_empty() {
        return None;
    }

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" | "bytes" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        "t" | "tb" | "tib" => 1 << 40,
        _ => return None,
    };

    if multiplier == 1 {
        return number.parse::<u64>().ok();
    }
    let value: f64 = number.parse().ok()?;
    Some((value * multiplier as f64).round() as u64)
}

/// Relevance filter applied to the links of a listing
#[derive(Debug, Clone)]
pub struct LinkFilter {
    /// `host[/path]` prefixes of absolute links worth keeping
    pub allowed_external: Vec<String>,
    /// Path fragments of hosting-platform pages that are never listings
    pub denied_segments: Vec<String>,
    /// Maximum number of links kept per listing
    pub max_links: usize,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::from_config(&crate::config::CrawlerConfig::default())
    }
}

impl LinkFilter {
    /// Builds the filter from the `[crawler]` configuration section
    pub fn from_config(config: &crate::config::CrawlerConfig) -> Self {
        Self {
            allowed_external: config.allowed_external.clone(),
            denied_segments: config.denied_segments.clone(),
            max_links: config.max_links_per_listing,
        }
    }

    /// Whether a single link survives the filter
    ///
    /// Dropped:
    /// - fragment-only, `mailto:` and `javascript:` links
    /// - absolute HTTP(S) links outside the allow-list
    /// - root-relative links that are neither directories nor archives
    /// - links through a denied path segment
    pub fn keep(&self, href: &str) -> bool {
        if href.is_empty() || href.starts_with('#') {
            return false;
        }

        let lower = href.to_ascii_lowercase();
        if lower.starts_with("mailto:") || lower.starts_with("javascript:") {
            return false;
        }

        if lower.starts_with("http://") || lower.starts_with("https://") {
            if !self
                .allowed_external
                .iter()
                .any(|entry| matches_allowed(entry, href))
            {
                return false;
            }
        } else if href.starts_with('/') && !href.ends_with('/') && !has_archive_extension(href) {
            return false;
        }

        !self
            .denied_segments
            .iter()
            .any(|segment| lower.contains(&segment.to_ascii_lowercase()))
    }

    /// Filters links in order and truncates to `max_links`
    pub fn apply(&self, links: Vec<ListingLink>) -> Vec<ListingLink> {
        let total = links.len();
        let kept: Vec<ListingLink> = links
            .into_iter()
            .filter(|link| self.keep(&link.href))
            .take(self.max_links)
            .collect();

        tracing::trace!("Kept {} of {} links", kept.len(), total);
        kept
    }
}
