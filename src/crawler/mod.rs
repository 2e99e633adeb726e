//! Crawler module for relayed directory listings
//!
//! This module contains the core search logic, including:
//! - Relay endpoint fallback with per-attempt deadlines
//! - Listing parsing and link filtering
//! - Link classification into directories and matching files
//! - Bounded recursive directory crawling
//! - Per-category and fan-out search coordination

mod classifier;
mod coordinator;
mod parser;
mod relay;
mod walker;

pub use classifier::{classify, has_archive_extension, LinkKind, ARCHIVE_EXTENSIONS};
pub use coordinator::{SearchCoordinator, SearchHit, SearchOutcome};
pub use parser::{extract_links, extract_listing, parse_size, LinkFilter, ListingLink};
pub use relay::{
    build_http_client, classify_body, AddressingStyle, AttemptOutcome, BodyVerdict, FetchedFile,
    ProbeReport, RelayClient, RelayEndpoint, FILE_TIMEOUT, LISTING_TIMEOUT,
};
pub use walker::{CrawlEntry, CrawlState, DirectoryCrawler, DEFAULT_MAX_DEPTH, DESCENT_DELAY};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::ScoutError;

/// Runs a search described entirely by a configuration
///
/// This is the main entry point for a one-shot search. It will:
/// 1. Build the category catalog (built-ins plus configured roots)
/// 2. Build the relay client and crawler
/// 3. Search one category, or all of them when `category_id` is `None`
///
/// Returns one `(category id, outcome)` pair per searched category, in
/// catalog order, so unconfigured categories stay distinguishable from
/// empty ones. Only set-up can fail.
pub async fn search(
    config: &Config,
    category_id: Option<&str>,
    text_filter: &str,
) -> Result<Vec<(String, SearchOutcome)>, ScoutError> {
    let catalog = Catalog::from_config(config)?;
    let coordinator = SearchCoordinator::from_config(config)?;

    match category_id {
        Some(id) => {
            let category = catalog
                .get(id)
                .ok_or_else(|| ScoutError::UnknownCategory(id.to_string()))?;
            let outcome = coordinator.search_category(category, text_filter).await;
            Ok(vec![(category.id.clone(), outcome)])
        }
        None => Ok(coordinator.search_all_outcomes(&catalog, text_filter).await),
    }
}
