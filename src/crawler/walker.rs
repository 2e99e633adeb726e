//! Recursive directory crawler
//!
//! Walks a listing tree from a root URL, descending into sub-directories
//! one at a time and collecting files that match a category. The walk is
//! bounded by depth and by a visited set, so link cycles on the remote
//! site cannot make it loop.

use crate::catalog::Category;
use crate::crawler::classifier::{classify, LinkKind};
use crate::crawler::parser::{extract_listing, LinkFilter};
use crate::crawler::relay::RelayClient;
use crate::url::{display_name, is_within, resolve_directory, resolve_file, visit_key};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// Default number of directory levels read, the root included
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Default pause between successive descents from one listing
pub const DESCENT_DELAY: Duration = Duration::from_millis(100);

/// A matching file found during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlEntry {
    /// Final path segment of the file, percent-decoded
    pub display_name: String,
    /// Absolute URL of the file
    pub download_url: Url,
    /// Size shown in the listing, if any
    pub size_bytes: Option<u64>,
}

/// Mutable state of one crawl tree
///
/// Owned by a single top-level crawl and threaded by `&mut` through every
/// recursive call. Never shared between crawls.
#[derive(Debug)]
pub struct CrawlState {
    visited: HashSet<String>,
    emitted: HashSet<String>,
    remaining_depth: u32,
}

impl CrawlState {
    pub fn new(max_depth: u32) -> Self {
        Self {
            visited: HashSet::new(),
            emitted: HashSet::new(),
            remaining_depth: max_depth,
        }
    }

    /// Whether a listing URL was already fetched in this crawl
    pub fn has_visited(&self, url: &Url) -> bool {
        self.visited.contains(&visit_key(url))
    }

    /// Number of distinct listings fetched (or attempted) so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn remaining_depth(&self) -> u32 {
        self.remaining_depth
    }
}

/// Crawls listing trees through a relay client
#[derive(Debug, Clone)]
pub struct DirectoryCrawler {
    relay: RelayClient,
    filter: LinkFilter,
    descent_delay: Duration,
}

impl DirectoryCrawler {
    pub fn new(relay: RelayClient) -> Self {
        Self {
            relay,
            filter: LinkFilter::default(),
            descent_delay: DESCENT_DELAY,
        }
    }

    pub fn with_filter(mut self, filter: LinkFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_descent_delay(mut self, delay: Duration) -> Self {
        self.descent_delay = delay;
        self
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    /// Crawls the tree under `root` and returns every matching file
    ///
    /// `max_depth` counts listing levels: 1 reads only the root, 2 the root
    /// and its direct sub-directories. A depth of 0 returns nothing and
    /// makes no request. Listings that cannot be fetched contribute
    /// nothing; the rest of the tree is still crawled.
    pub async fn crawl(&self, root: &Url, category: &Category, max_depth: u32) -> Vec<CrawlEntry> {
        let mut state = CrawlState::new(max_depth);
        self.crawl_with_state(root, category, &mut state).await
    }

    /// Same as [`crawl`](Self::crawl) with caller-provided state
    pub async fn crawl_with_state(
        &self,
        root: &Url,
        category: &Category,
        state: &mut CrawlState,
    ) -> Vec<CrawlEntry> {
        let entries = self.crawl_node(root.clone(), root, category, state).await;
        tracing::debug!(
            "Crawl of {} finished: {} listings, {} files",
            root,
            state.visited_count(),
            entries.len()
        );
        entries
    }

    fn crawl_node<'a>(
        &'a self,
        base: Url,
        root: &'a Url,
        category: &'a Category,
        state: &'a mut CrawlState,
    ) -> Pin<Box<dyn Future<Output = Vec<CrawlEntry>> + Send + 'a>> {
        Box::pin(async move {
            let key = visit_key(&base);
            if state.remaining_depth == 0 || state.visited.contains(&key) {
                return Vec::new();
            }
            state.visited.insert(key);

            let Some(html) = self.relay.fetch_listing(base.as_str()).await else {
                tracing::debug!("No listing for {}, skipping subtree", base);
                return Vec::new();
            };

            let links = self.filter.apply(extract_listing(&html));
            let mut entries = Vec::new();
            let mut descended = false;

            for link in links {
                match classify(&link.href, category) {
                    LinkKind::Directory => {
                        if state.remaining_depth <= 1 {
                            continue;
                        }
                        let Some(child) = resolve_directory(&base, &link.href) else {
                            continue;
                        };
                        if !is_within(root, &child) || state.has_visited(&child) {
                            continue;
                        }

                        if descended && !self.descent_delay.is_zero() {
                            tokio::time::sleep(self.descent_delay).await;
                        }
                        descended = true;

                        tracing::trace!("Descending into {}", child);
                        state.remaining_depth -= 1;
                        let children = self.crawl_node(child, root, category, state).await;
                        state.remaining_depth += 1;
                        entries.extend(children);
                    }
                    LinkKind::File => {
                        let Some(url) = resolve_file(&base, &link.href) else {
                            continue;
                        };
                        if !state.emitted.insert(url.as_str().to_string()) {
                            continue;
                        }
                        entries.push(CrawlEntry {
                            display_name: display_name(&url),
                            download_url: url,
                            size_bytes: link.size_hint,
                        });
                    }
                    LinkKind::Ignore => {}
                }
            }

            tracing::debug!("{}: {} matching files at or below", base, entries.len());
            entries
        })
    }
}
