//! Search coordinator - per-category and fan-out searches
//!
//! This module sits on top of the directory crawler and:
//! - Resolves a category's root URL (or reports it as unconfigured)
//! - Applies the free-text filter to crawl results
//! - Tags results with their owning category
//! - Runs one independent crawl per category concurrently and merges the
//!   results in declaration order

use crate::catalog::{Catalog, Category};
use crate::config::Config;
use crate::crawler::parser::LinkFilter;
use crate::crawler::relay::RelayClient;
use crate::crawler::walker::{CrawlEntry, DirectoryCrawler, DEFAULT_MAX_DEPTH};
use crate::url::normalize_root_url;
use crate::ScoutError;
use std::time::Duration;

/// A crawl entry tagged with the category it was found for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub category_id: String,
    pub category_label: String,
    pub entry: CrawlEntry,
}

/// Result of searching one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The category has no root URL; nothing was crawled
    Unconfigured,
    /// The crawl ran but nothing matched (or nothing could be fetched)
    Empty,
    /// Matching files
    Entries(Vec<SearchHit>),
}

impl SearchOutcome {
    fn from_hits(hits: Vec<SearchHit>) -> Self {
        if hits.is_empty() {
            Self::Empty
        } else {
            Self::Entries(hits)
        }
    }

    pub fn is_unconfigured(&self) -> bool {
        matches!(self, Self::Unconfigured)
    }

    /// The hits of this outcome; empty unless `Entries`
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            Self::Entries(hits) => hits,
            Self::Unconfigured | Self::Empty => &[],
        }
    }

    pub fn into_hits(self) -> Vec<SearchHit> {
        match self {
            Self::Entries(hits) => hits,
            Self::Unconfigured | Self::Empty => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.hits().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits().is_empty()
    }
}

/// Runs category searches
///
/// Holds no per-search state; clones share the relay client's connection
/// pool, so one coordinator can serve concurrent searches.
#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    crawler: DirectoryCrawler,
    max_depth: u32,
}

impl SearchCoordinator {
    pub fn new(crawler: DirectoryCrawler) -> Self {
        Self {
            crawler,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builds a coordinator (relay client, link filter, crawler) from configuration
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let relay = RelayClient::from_config(&config.relay)?;
        let crawler = DirectoryCrawler::new(relay)
            .with_filter(LinkFilter::from_config(&config.crawler))
            .with_descent_delay(Duration::from_millis(config.crawler.descent_delay_ms));

        Ok(Self::new(crawler).with_max_depth(config.crawler.max_depth))
    }

    pub fn crawler(&self) -> &DirectoryCrawler {
        &self.crawler
    }

    /// Searches a single category
    ///
    /// Returns `Unconfigured` without any network traffic when the category
    /// has no root URL. A `text_filter` that is not blank keeps only entries
    /// whose display name contains it verbatim (surrounding whitespace
    /// included), ignoring case.
    pub async fn search_category(&self, category: &Category, text_filter: &str) -> SearchOutcome {
        let Some(root) = category.root_url() else {
            tracing::warn!("No root URL configured for {}", category.label);
            return SearchOutcome::Unconfigured;
        };

        let root = match normalize_root_url(root.as_str()) {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!("Unusable root URL for {}: {}", category.label, e);
                return SearchOutcome::Unconfigured;
            }
        };

        tracing::info!("Searching {} under {}", category.label, root);
        let entries = self.crawler.crawl(&root, category, self.max_depth).await;

        // A blank filter means no filter; otherwise match it as given
        let needle = (!text_filter.trim().is_empty()).then(|| text_filter.to_lowercase());
        let hits: Vec<SearchHit> = entries
            .into_iter()
            .filter(|entry| match &needle {
                Some(needle) => entry.display_name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .map(|entry| SearchHit {
                category_id: category.id.clone(),
                category_label: category.label.clone(),
                entry,
            })
            .collect();

        tracing::info!("Found {} matching files for {}", hits.len(), category.label);
        SearchOutcome::from_hits(hits)
    }

    /// Searches every category concurrently, keeping per-category outcomes
    ///
    /// One task per category, each with its own crawl state. Outcomes come
    /// back in catalog order. A task that panics yields `Empty` for its
    /// category and does not affect the others.
    pub async fn search_all_outcomes(
        &self,
        catalog: &Catalog,
        text_filter: &str,
    ) -> Vec<(String, SearchOutcome)> {
        let handles: Vec<_> = catalog
            .iter()
            .map(|category| {
                let coordinator = self.clone();
                let category = category.clone();
                let text_filter = text_filter.to_string();
                let id = category.id.clone();
                let handle = tokio::spawn(async move {
                    coordinator.search_category(&category, &text_filter).await
                });
                (id, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Search task for {} failed: {}", id, e);
                    SearchOutcome::Empty
                }
            };
            outcomes.push((id, outcome));
        }
        outcomes
    }

    /// Searches every category concurrently and concatenates the hits
    pub async fn search_all(&self, catalog: &Catalog, text_filter: &str) -> Vec<SearchHit> {
        let outcomes = self.search_all_outcomes(catalog, text_filter).await;
        let hits: Vec<SearchHit> = outcomes
            .into_iter()
            .flat_map(|(_, outcome)| outcome.into_hits())
            .collect();

        tracing::info!("Found {} matching files across all categories", hits.len());
        hits
    }
}
